use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PvsError {
    /// Not a single worker thread could be spawned
    NoWorkerThreads,
    /// The pool finished but some portals were never claimed or never got
    /// their result stored
    QueueNotDrained { completed: usize, total: usize },
    /// No seg in the level has a partner in another subsector
    NoPortals,
    /// A leaf is bounded by more than `MAX_PORTALS_ON_LEAF` portals
    TooManyPortals { leaf: usize },
    /// A subsector's seg span is outside the seg array, or a seg belongs to no
    /// subsector
    BadSubsector { subsector: usize },
    /// The merged portal bits of a leaf contain the leaf itself
    LeafSawItself { leaf: usize },
}

impl PvsError {
    /// Errors that invalidate the whole build. Everything else means the
    /// level can't be vised and the caller may fall back to "all visible".
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PvsError::NoWorkerThreads | PvsError::QueueNotDrained { .. }
        )
    }
}

impl Error for PvsError {}

impl fmt::Display for PvsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PvsError::NoWorkerThreads => write!(f, "cannot create worker threads"),
            PvsError::QueueNotDrained { completed, total } => write!(
                f,
                "worker threads did not drain the queue ({completed} of {total} portals done)"
            ),
            PvsError::NoPortals => write!(f, "no possible portals found"),
            PvsError::TooManyPortals { leaf } => write!(f, "leaf {leaf} has too many portals"),
            PvsError::BadSubsector { subsector } => {
                write!(f, "subsector {subsector} has an invalid seg range")
            }
            PvsError::LeafSawItself { leaf } => write!(f, "leaf {leaf} portals saw into leaf"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PvsError;

    #[test]
    fn fatal_split() {
        assert!(PvsError::NoWorkerThreads.is_fatal());
        assert!(
            PvsError::QueueNotDrained {
                completed: 3,
                total: 9
            }
            .is_fatal()
        );
        assert!(!PvsError::NoPortals.is_fatal());
        assert!(!PvsError::TooManyPortals { leaf: 1 }.is_fatal());
        assert!(!PvsError::LeafSawItself { leaf: 0 }.is_fatal());
    }

    #[test]
    fn messages() {
        assert_eq!(
            PvsError::NoWorkerThreads.to_string(),
            "cannot create worker threads"
        );
        assert!(
            PvsError::QueueNotDrained {
                completed: 3,
                total: 9
            }
            .to_string()
            .starts_with("worker threads did not drain the queue")
        );
    }
}
