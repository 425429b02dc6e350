/// A wrapping counter for the sequence ids of one message type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct SequenceIdGenerator {
    next: u16,
}

impl SequenceIdGenerator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn generate(&mut self) -> u16 {
        let id = self.next;
        self.next = self.next.wrapping_add(1);
        id
    }
}

/// Sequence ids are counted independently per message type
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct SequenceIds {
    pub(crate) announce: SequenceIdGenerator,
    pub(crate) sync: SequenceIdGenerator,
    pub(crate) delay_req: SequenceIdGenerator,
    pub(crate) pdelay_req: SequenceIdGenerator,
}
