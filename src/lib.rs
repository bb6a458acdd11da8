//! Read and write CloudFormation templates as a typed object model.
//!
//! Templates load from JSON or YAML (short-form tags such as `!Ref` and
//! `!GetAtt` included) into a [`Template`] whose property values are
//! [`Value`] trees: literals or intrinsic function calls. Resources whose
//! type is in the [`Catalog`] are specialized into typed records; all others
//! keep generic properties. Dumping always emits the long form.
//!
//! ```
//! use cfn_model::{Format, Template, Value};
//!
//! let template = Template::load(
//!     br#"
//! Resources:
//!   MyQueue:
//!     Type: AWS::SQS::Queue
//!     Properties:
//!       QueueName: !Sub "${Env}-queue"
//! "#,
//! )?;
//!
//! let queue = template.get_sqs_queue_with_name("MyQueue")?;
//! assert_eq!(queue.queue_name, Some(Value::sub("${Env}-queue")));
//!
//! let json = String::from_utf8(template.dump(Format::Json)?)?;
//! assert!(json.contains(r#""Fn::Sub": "${Env}-queue""#));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod catalog;
pub mod codec;
pub mod errors;
pub mod intrinsics;
pub mod node;
pub mod references;
pub mod resource;
pub mod resources;
pub mod template;
pub mod value;

pub use catalog::{Catalog, CloudFormationResource};
pub use errors::{Error, LookupError, Path, Result, StructureErrorKind};
pub use intrinsics::FunctionName;
pub use node::{Format, Node};
pub use resource::{Resource, RetentionPolicy, Specialization};
pub use template::{Loader, Output, Parameter, Template, Transform};
pub use value::{Literal, Value, ValueMap};
