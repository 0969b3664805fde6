use owo_colors::{OwoColorize, Stream};
use std::fmt::{self, Display};

/// Face printed next to the outcome of a subcommand
#[derive(Clone, Copy)]
pub enum Kaomoji {
    Failure,
    Success,
}

impl Display for Kaomoji {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failure => write!(
                f,
                "{}",
                "(┬┬﹏┬┬)".if_supports_color(Stream::Stdout, |text| text.red())
            ),
            Self::Success => write!(
                f,
                "{}",
                "(^///^)".if_supports_color(Stream::Stdout, |text| text.green())
            ),
        }
    }
}
