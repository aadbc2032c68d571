use std::process::ExitCode;

/// How a command finished, with an optional closing line.
#[derive(Debug)]
pub struct Exit {
    code: ExitCode,
    message: Option<String>,
}

impl Exit {
    #[must_use]
    pub fn success() -> Self {
        Self {
            code: ExitCode::SUCCESS,
            message: None,
        }
    }

    #[must_use]
    pub fn error() -> Self {
        Self {
            code: ExitCode::FAILURE,
            message: None,
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.code == ExitCode::SUCCESS
    }

    pub fn report(self) -> ExitCode {
        if let Some(message) = self.message {
            if self.code == ExitCode::SUCCESS {
                println!("{message}");
            } else {
                eprintln!("{message}");
            }
        }
        self.code
    }
}
