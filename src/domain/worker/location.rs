//! Where the encoder worker program lives

use std::fmt;
use std::str::FromStr;

use crate::domain::error::InvalidWorkerLocation;

/// Keyword selecting the in-process encoder
pub const BUILTIN_WORKER: &str = "builtin";

/// Location of the encoder worker to spawn.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WorkerLocation {
    /// LAME encoder on a dedicated thread inside this process
    #[default]
    Builtin,
    /// External program speaking the line-delimited JSON protocol on stdio
    Command { program: String, args: Vec<String> },
}

impl FromStr for WorkerLocation {
    type Err = InvalidWorkerLocation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case(BUILTIN_WORKER) {
            return Ok(Self::Builtin);
        }

        let mut parts = trimmed.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or_else(|| InvalidWorkerLocation {
            input: s.to_string(),
        })?;

        Ok(Self::Command {
            program,
            args: parts.collect(),
        })
    }
}

impl fmt::Display for WorkerLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin => f.write_str(BUILTIN_WORKER),
            Self::Command { program, args } => {
                f.write_str(program)?;
                for arg in args {
                    write!(f, " {}", arg)?;
                }
                Ok(())
            }
        }
    }
}
