use crate::modem::sstv::{
    image::Channel,
    modes::ModeSpecification,
};

/// Position in the transmission sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    Header { header_state: HeaderState },
    Line { y: usize, line_state: LineState },
}

impl Default for State {
    fn default() -> Self {
        State::Header {
            header_state: HeaderState::Leader1,
        }
    }
}

impl State {
    pub fn next(&self, mode: &ModeSpecification) -> Option<Self> {
        let mut state = *self;
        match &mut state {
            Self::Header { header_state } => {
                match header_state {
                    HeaderState::Leader1 => *header_state = HeaderState::LeaderBreak,
                    HeaderState::LeaderBreak => *header_state = HeaderState::Leader2,
                    HeaderState::Leader2 => *header_state = HeaderState::VisStart,
                    HeaderState::VisStart => {
                        *header_state = HeaderState::VisBit { bit: 0 };
                    }
                    HeaderState::VisBit { bit } => {
                        *bit += 1;
                        if *bit == 7 {
                            *header_state = HeaderState::VisStop;
                        }
                    }
                    HeaderState::VisStop => {
                        state = State::Line {
                            y: 0,
                            line_state: LineState::Sync,
                        }
                    }
                }
            }
            Self::Line { y, line_state } => {
                match line_state {
                    LineState::Sync => *line_state = LineState::Porch,
                    LineState::Porch => *line_state = LineState::Luma,
                    LineState::Luma => *line_state = LineState::Separator,
                    LineState::Separator => *line_state = LineState::SeparatorPorch,
                    LineState::SeparatorPorch => *line_state = LineState::Chroma,
                    LineState::Chroma => {
                        *y += 1;
                        if *y == mode.num_lines {
                            return None;
                        }
                        *line_state = LineState::Sync;
                    }
                }
            }
        }

        Some(state)
    }

    /// Iterates over all states of a transmission, starting at the first
    /// leader tone.
    pub fn sequence(mode: &ModeSpecification) -> impl Iterator<Item = State> + '_ {
        std::iter::successors(Some(State::default()), move |state| state.next(mode))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeaderState {
    Leader1,
    LeaderBreak,
    Leader2,
    VisStart,
    VisBit { bit: u8 },
    VisStop,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineState {
    Sync,
    Porch,
    Luma,
    Separator,
    SeparatorPorch,
    Chroma,
}

/// Chroma channel sent on line `y`: V on even lines, U on odd lines.
#[inline]
pub fn chroma_channel(y: usize) -> Channel {
    if y % 2 == 0 { Channel::V } else { Channel::U }
}
