use crate::error::{CrudError, RequireSomeError};

/// Turn "zero or one row" into "exactly one row".
pub trait RequireSome<A> {
    fn require_some(self, message: impl Into<String>) -> Result<A, CrudError>;
}

impl<A, E> RequireSome<A> for Result<Option<A>, E>
where
    E: Into<CrudError>,
{
    fn require_some(self, message: impl Into<String>) -> Result<A, CrudError> {
        match self {
            Ok(Some(a)) => Ok(a),
            Ok(None) => Err(RequireSomeError::new(message).into()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn present_values_pass_through() {
        let r: Result<Option<u8>, CrudError> = Ok(Some(1));
        assert_eq!(r.require_some("x").unwrap(), 1);
    }

    #[test]
    fn missing_values_become_require_some() {
        let r: Result<Option<u8>, CrudError> = Ok(None);
        match r.require_some("fetch_id: \"t\" : 1") {
            Err(CrudError::RequireSome(e)) => assert_eq!(e.message, "fetch_id: \"t\" : 1"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn driver_errors_are_unchanged() {
        let r: Result<Option<u8>, sqlx::Error> = Err(sqlx::Error::PoolTimedOut);
        assert!(matches!(r.require_some("x"), Err(CrudError::Db(sqlx::Error::PoolTimedOut))));
    }
}
