//! Builtin catalog snapshot: typed records for a handful of resource types
//! and the per-type accessors on [`Template`](crate::template::Template).
//!
//! Records are declared with `cfn_resource!`, which expands a property list
//! into a struct of optional [`Value`](crate::value::Value) fields plus its
//! [`CloudFormationResource`](crate::catalog::CloudFormationResource) impl.

macro_rules! cfn_resource {
    (
        $(#[$meta:meta])*
        pub struct $name:ident = $type_name:literal {
            $( $(#[$field_meta:meta])* $key:literal => $field:ident, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name {
            $( $(#[$field_meta])* pub $field: Option<$crate::value::Value>, )+
        }

        impl $crate::catalog::CloudFormationResource for $name {
            const TYPE_NAME: &'static str = $type_name;

            fn from_properties(
                mut properties: $crate::value::ValueMap,
            ) -> $crate::errors::Result<Self> {
                let resource = Self {
                    $( $field: properties.shift_remove($key), )+
                };
                $crate::catalog::reject_unknown_properties($type_name, properties)?;
                Ok(resource)
            }

            fn to_properties(&self) -> $crate::value::ValueMap {
                let mut properties = $crate::value::ValueMap::new();
                $(
                    if let Some(value) = &self.$field {
                        properties.insert($key.to_string(), value.clone());
                    }
                )+
                properties
            }

            fn values(&self) -> Vec<&$crate::value::Value> {
                [$( self.$field.as_ref(), )+].into_iter().flatten().collect()
            }

            fn values_mut(&mut self) -> Vec<&mut $crate::value::Value> {
                let mut values = Vec::new();
                $(
                    if let Some(value) = self.$field.as_mut() {
                        values.push(value);
                    }
                )+
                values
            }
        }
    };
}

macro_rules! typed_accessors {
    ( $( $ty:ty => $all:ident, $one:ident; )+ ) => {
        impl $crate::template::Template {
            $(
                #[doc = concat!("All `", stringify!($ty), "` resources, in template order.")]
                pub fn $all(&self) -> indexmap::IndexMap<&str, &$ty> {
                    self.resources_of::<$ty>()
                }

                #[doc = concat!("The `", stringify!($ty), "` resource with the given logical id.")]
                pub fn $one(&self, logical_id: &str) -> Result<&$ty, $crate::errors::LookupError> {
                    self.resource_with_name::<$ty>(logical_id)
                }
            )+
        }
    };
}

pub mod lambda;
pub mod s3;
pub mod sns;
pub mod sqs;

use crate::catalog::Catalog;

pub(crate) fn register_builtin(catalog: &mut Catalog) {
    catalog
        .register::<lambda::Function>()
        .register::<s3::Bucket>()
        .register::<s3::BucketPolicy>()
        .register::<sns::Subscription>()
        .register::<sns::Topic>()
        .register::<sqs::Queue>()
        .register::<sqs::QueuePolicy>();
}

typed_accessors! {
    lambda::Function => get_all_lambda_function_resources, get_lambda_function_with_name;
    s3::Bucket => get_all_s3_bucket_resources, get_s3_bucket_with_name;
    s3::BucketPolicy => get_all_s3_bucket_policy_resources, get_s3_bucket_policy_with_name;
    sns::Subscription => get_all_sns_subscription_resources, get_sns_subscription_with_name;
    sns::Topic => get_all_sns_topic_resources, get_sns_topic_with_name;
    sqs::Queue => get_all_sqs_queue_resources, get_sqs_queue_with_name;
    sqs::QueuePolicy => get_all_sqs_queue_policy_resources, get_sqs_queue_policy_with_name;
}
