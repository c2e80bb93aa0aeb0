//! Application error carried up to `main`, which prints the message and exits
//! with the code.
//!
//! | code | meaning                                              |
//! | ---- | ---------------------------------------------------- |
//! | 2    | bad input: paths, CSV schema, flags, env settings    |
//! | 3    | no usable data: empty catalog, unresolved company    |
//! | 4    | runtime: network, terminal, workbook rendering       |

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn input(message: impl Into<String>) -> Self {
        Self::new(2, message)
    }

    pub fn no_data(message: impl Into<String>) -> Self {
        Self::new(3, message)
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(4, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_exit_codes() {
        assert_eq!(AppError::input("x").exit_code(), 2);
        assert_eq!(AppError::no_data("x").exit_code(), 3);
        let err = AppError::runtime("network down");
        assert_eq!(err.exit_code(), 4);
        assert_eq!(err.to_string(), "network down");
    }
}
