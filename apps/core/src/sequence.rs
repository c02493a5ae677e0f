/// Remote lists that can be superseded by a newer request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Countries,
    Cities,
    Timings,
}

impl Field {
    const fn index(self) -> usize {
        match self {
            Self::Countries => 0,
            Self::Cities => 1,
            Self::Timings => 2,
        }
    }
}

/// Tag attached to a fetch; its response is applied only while it is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    pub field: Field,
    pub seq: u64,
}

#[derive(Debug, Clone, Default)]
pub struct RequestSequencer {
    latest: [u64; 3],
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self, field: Field) -> Ticket {
        let slot = &mut self.latest[field.index()];
        *slot += 1;
        Ticket {
            field,
            seq: *slot,
        }
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest[ticket.field.index()] == ticket.seq
    }

    /// Supersedes whatever is in flight for `field`.
    pub fn invalidate(&mut self, field: Field) {
        self.latest[field.index()] += 1;
    }

    pub fn invalidate_all(&mut self) {
        for field in [Field::Countries, Field::Cities, Field::Timings] {
            self.invalidate(field);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_latest_ticket_is_current() {
        let mut sequencer = RequestSequencer::new();
        let first = sequencer.issue(Field::Countries);
        let second = sequencer.issue(Field::Countries);

        assert!(!sequencer.is_current(first));
        assert!(sequencer.is_current(second));
    }

    #[test]
    fn fields_are_sequenced_independently() {
        let mut sequencer = RequestSequencer::new();
        let countries = sequencer.issue(Field::Countries);
        let cities = sequencer.issue(Field::Cities);
        sequencer.issue(Field::Timings);

        assert!(sequencer.is_current(countries));
        assert!(sequencer.is_current(cities));
    }

    #[test]
    fn invalidation_supersedes_in_flight_tickets() {
        let mut sequencer = RequestSequencer::new();
        let timings = sequencer.issue(Field::Timings);
        let cities = sequencer.issue(Field::Cities);

        sequencer.invalidate_all();

        assert!(!sequencer.is_current(timings));
        assert!(!sequencer.is_current(cities));
        let fresh = sequencer.issue(Field::Timings);
        assert!(sequencer.is_current(fresh));
    }
}
