//! Intrinsic function names and their two spellings.
//!
//! Long form is the single-key mapping used by JSON (`{"Fn::Join": ...}`);
//! short form is the YAML tag (`!Join ...`). Both resolve to one
//! [`FunctionName`].

use std::collections::HashMap;
use std::fmt;

use lazy_static::lazy_static;

use crate::errors::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionName {
    Ref,
    GetAtt,
    Join,
    Sub,
    Select,
    Split,
    FindInMap,
    ImportValue,
    If,
    Not,
    And,
    Or,
    Equals,
    Base64,
    Cidr,
    GetAZs,
    Condition,
    Transform,
    // Only meaningful inside the Rules section.
    Contains,
    EachMemberEquals,
    EachMemberIn,
    RefAll,
    ValueOf,
    ValueOfAll,
}

pub const ALL_FUNCTIONS: [FunctionName; 24] = [
    FunctionName::Ref,
    FunctionName::GetAtt,
    FunctionName::Join,
    FunctionName::Sub,
    FunctionName::Select,
    FunctionName::Split,
    FunctionName::FindInMap,
    FunctionName::ImportValue,
    FunctionName::If,
    FunctionName::Not,
    FunctionName::And,
    FunctionName::Or,
    FunctionName::Equals,
    FunctionName::Base64,
    FunctionName::Cidr,
    FunctionName::GetAZs,
    FunctionName::Condition,
    FunctionName::Transform,
    FunctionName::Contains,
    FunctionName::EachMemberEquals,
    FunctionName::EachMemberIn,
    FunctionName::RefAll,
    FunctionName::ValueOf,
    FunctionName::ValueOfAll,
];

lazy_static! {
    static ref LONG_FORM: HashMap<&'static str, FunctionName> = ALL_FUNCTIONS
        .iter()
        .map(|function| (function.key(), *function))
        .collect();
    static ref SHORT_FORM: HashMap<&'static str, FunctionName> = ALL_FUNCTIONS
        .iter()
        .map(|function| (function.tag(), *function))
        .collect();
}

/// Prefix shared by every long-form key except `Ref` and `Condition`.
pub const FN_PREFIX: &str = "Fn::";

impl FunctionName {
    /// Long-form mapping key.
    pub fn key(self) -> &'static str {
        match self {
            FunctionName::Ref => "Ref",
            FunctionName::GetAtt => "Fn::GetAtt",
            FunctionName::Join => "Fn::Join",
            FunctionName::Sub => "Fn::Sub",
            FunctionName::Select => "Fn::Select",
            FunctionName::Split => "Fn::Split",
            FunctionName::FindInMap => "Fn::FindInMap",
            FunctionName::ImportValue => "Fn::ImportValue",
            FunctionName::If => "Fn::If",
            FunctionName::Not => "Fn::Not",
            FunctionName::And => "Fn::And",
            FunctionName::Or => "Fn::Or",
            FunctionName::Equals => "Fn::Equals",
            FunctionName::Base64 => "Fn::Base64",
            FunctionName::Cidr => "Fn::Cidr",
            FunctionName::GetAZs => "Fn::GetAZs",
            FunctionName::Condition => "Condition",
            FunctionName::Transform => "Fn::Transform",
            FunctionName::Contains => "Fn::Contains",
            FunctionName::EachMemberEquals => "Fn::EachMemberEquals",
            FunctionName::EachMemberIn => "Fn::EachMemberIn",
            FunctionName::RefAll => "Fn::RefAll",
            FunctionName::ValueOf => "Fn::ValueOf",
            FunctionName::ValueOfAll => "Fn::ValueOfAll",
        }
    }

    /// Short-form YAML tag, without the leading `!`.
    pub fn tag(self) -> &'static str {
        let key = self.key();
        key.strip_prefix(FN_PREFIX).unwrap_or(key)
    }

    /// Resolve a long-form key.
    ///
    /// Returns `Ok(None)` for keys that are not function names at all, and
    /// an error for `Fn::` keys this crate does not know: those must never be
    /// mistaken for a literal property.
    pub fn from_key(key: &str) -> Result<Option<FunctionName>> {
        match LONG_FORM.get(key) {
            Some(function) => Ok(Some(*function)),
            None if key.starts_with(FN_PREFIX) => Err(Error::unknown_intrinsic(key)),
            None => Ok(None),
        }
    }

    /// Resolve a short-form tag (without `!`).
    pub fn from_tag(tag: &str) -> Result<FunctionName> {
        SHORT_FORM
            .get(tag)
            .copied()
            .ok_or_else(|| Error::unknown_intrinsic(format!("!{}", tag)))
    }

    /// Functions whose long form holds one bare argument instead of a list.
    pub(crate) fn takes_scalar(self) -> bool {
        matches!(
            self,
            FunctionName::Ref
                | FunctionName::Condition
                | FunctionName::Base64
                | FunctionName::ImportValue
                | FunctionName::GetAZs
                | FunctionName::Transform
                | FunctionName::RefAll
        )
    }

    /// Rule functions, accepted only in rule conditions and assertions.
    pub fn is_rule_function(self) -> bool {
        matches!(
            self,
            FunctionName::Contains
                | FunctionName::EachMemberEquals
                | FunctionName::EachMemberIn
                | FunctionName::RefAll
                | FunctionName::ValueOf
                | FunctionName::ValueOfAll
        )
    }
}

impl fmt::Display for FunctionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

pub mod pseudo {
    //! Parameters CloudFormation defines for every stack.

    pub const ACCOUNT_ID: &str = "AWS::AccountId";
    pub const NOTIFICATION_ARNS: &str = "AWS::NotificationARNs";
    pub const NO_VALUE: &str = "AWS::NoValue";
    pub const PARTITION: &str = "AWS::Partition";
    pub const REGION: &str = "AWS::Region";
    pub const STACK_ID: &str = "AWS::StackId";
    pub const STACK_NAME: &str = "AWS::StackName";
    pub const URL_SUFFIX: &str = "AWS::URLSuffix";

    pub const ALL: [&str; 8] = [
        ACCOUNT_ID,
        NOTIFICATION_ARNS,
        NO_VALUE,
        PARTITION,
        REGION,
        STACK_ID,
        STACK_NAME,
        URL_SUFFIX,
    ];
}

/// Checks if a name is a CloudFormation pseudo parameter.
pub fn is_pseudo_parameter(name: &str) -> bool {
    name.starts_with("AWS::")
}
