use crate::creator::CreatorId;
use crate::instance::ErrorPtr;
use itertools::Itertools;
use thiserror::Error;

fn format_chain(chain: &[String]) -> String {
    chain.iter().map(|name| format!("\"{name}\"")).join("->")
}

/// Errors related to resolving instances from a container.
#[derive(Error, Clone, Debug)]
pub enum ResolutionError {
    #[error("Dependency \"{name}\" ({id}) is not registered")]
    NotRegistered { id: CreatorId, name: String },
    #[error("No dependency with tag \"{0}\" is registered")]
    NotRegisteredTag(String),
    #[error("Cyclic dependency found! [{}]", format_chain(.0))]
    CyclicDependency(Vec<String>),
    #[error("Tried to downcast instance to incompatible type: {0}")]
    IncompatibleInstance(&'static str),
    #[error("Error creating instance: {0}")]
    ConstructorError(ErrorPtr),
}

/// Errors related to registering creators.
#[derive(Error, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub enum RegistrationError {
    #[error("Anonymous creators without a source location are not supported - there is no way of identifying them")]
    AnonymousCreatorWithoutSource,
    #[error("Attempted to override creator {name} registered from {previous:?} with one from {current:?}")]
    OverrideNotAllowed {
        name: String,
        previous: Option<String>,
        current: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use crate::creator::CreatorId;
    use crate::error::ResolutionError;

    #[test]
    fn should_format_cycle_chain() {
        let error = ResolutionError::CyclicDependency(vec![
            "a".to_string(),
            "b".to_string(),
            "c".to_string(),
            "a".to_string(),
        ]);

        assert_eq!(
            error.to_string(),
            r#"Cyclic dependency found! ["a"->"b"->"c"->"a"]"#
        );
    }

    #[test]
    fn should_name_missing_dependency() {
        let error = ResolutionError::NotRegistered {
            id: CreatorId::next(),
            name: "logger".to_string(),
        };

        assert!(error
            .to_string()
            .starts_with(r#"Dependency "logger" (#"#));
    }

    #[test]
    fn should_name_missing_tag() {
        assert_eq!(
            ResolutionError::NotRegisteredTag("{tag}".to_string()).to_string(),
            r#"No dependency with tag "{tag}" is registered"#
        );
    }
}
