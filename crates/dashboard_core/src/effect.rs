use crate::envelope::PageRequest;
use crate::store::SessionGeneration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    OpenSession {
        generation: SessionGeneration,
    },
    Send {
        generation: SessionGeneration,
        request: PageRequest,
    },
    CloseSession {
        generation: SessionGeneration,
    },
}
