use std::any::Any;
use std::fmt::{Display, Error as FmtError, Formatter};

/// Failures that abort a whole run
///
/// Problems with individual classes or members never end up here: those become findings.
#[derive(Debug)]
pub enum Error {
    /// Supertypes of required classes that cannot be resolved
    ClosureViolation { missing: Vec<String> },

    /// The checking loop could not carry on (the message is from the panic that stopped it)
    ResourceExhaustion(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        match self {
            Error::ClosureViolation { missing } => write!(
                f,
                "the following classes are required, but missing: {}",
                missing.join(", ")
            ),
            Error::ResourceExhaustion(message) => write!(f, "run aborted: {}", message),
        }
    }
}

impl std::error::Error for Error {}

/// Panic payload caught around the checking loop
impl From<Box<dyn Any + Send + 'static>> for Error {
    fn from(payload: Box<dyn Any + Send + 'static>) -> Error {
        let message: String = if let Some(e) = payload.downcast_ref::<&'static str>() {
            String::from(*e)
        } else if let Some(e) = payload.downcast_ref::<String>() {
            String::from(e)
        } else {
            String::from("unknown error")
        };
        Error::ResourceExhaustion(message)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn panic_payloads() {
        let err = Error::from(std::panic::catch_unwind(|| panic!("stack depth")).unwrap_err());
        assert_eq!(err.to_string(), "run aborted: stack depth");

        let payload: Box<dyn Any + Send> = Box::new(42u8);
        assert!(matches!(Error::from(payload), Error::ResourceExhaustion(m) if m == "unknown error"));
    }

    #[test]
    fn closure_violation_message() {
        let err = Error::ClosureViolation {
            missing: vec![String::from("a.Gone"), String::from("b.Gone")],
        };
        assert_eq!(
            err.to_string(),
            "the following classes are required, but missing: a.Gone, b.Gone"
        );
    }
}
