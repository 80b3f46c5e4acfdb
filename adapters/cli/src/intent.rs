//! Line-oriented intent parsing.

use std::str::FromStr;

use tactics_sandbox_core::{CellCoord, TerrainWeights};
use thiserror::Error;

/// Single user request read from the terminal or a script.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Intent {
    Select(CellCoord),
    Edit(CellCoord),
    Generate,
    Resize { width: u32, height: u32 },
    Weights(TerrainWeights),
    Ranges { move_range: u32, attack_range: u32 },
    Step,
    Show,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum IntentError {
    #[error("unknown intent `{0}`")]
    Unknown(String),
    #[error("`{intent}` expects {expected} argument(s), got {found}")]
    Arity {
        intent: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("`{0}` is not a non-negative integer")]
    Number(String),
}

/// Parses a line; blank lines and `#` comments yield `None`.
pub(crate) fn parse(line: &str) -> Result<Option<Intent>, IntentError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut words = line.split_whitespace();
    let Some(keyword) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let intent = match keyword.to_ascii_lowercase().as_str() {
        "select" => {
            let [x, y] = numbers("select", &args)?;
            Intent::Select(CellCoord::new(x, y))
        }
        "edit" => {
            let [x, y] = numbers("edit", &args)?;
            Intent::Edit(CellCoord::new(x, y))
        }
        "generate" => {
            let [] = numbers::<0>("generate", &args)?;
            Intent::Generate
        }
        "resize" => {
            let [width, height] = numbers("resize", &args)?;
            Intent::Resize { width, height }
        }
        "weights" => {
            let [traversable, obstacle, cover] = numbers("weights", &args)?;
            Intent::Weights(TerrainWeights::new(traversable, obstacle, cover))
        }
        "ranges" => {
            let [move_range, attack_range] = numbers("ranges", &args)?;
            Intent::Ranges {
                move_range,
                attack_range,
            }
        }
        "step" => {
            let [] = numbers::<0>("step", &args)?;
            Intent::Step
        }
        "show" => {
            let [] = numbers::<0>("show", &args)?;
            Intent::Show
        }
        "quit" | "exit" => Intent::Quit,
        _ => return Err(IntentError::Unknown(keyword.to_owned())),
    };
    Ok(Some(intent))
}

fn numbers<const N: usize>(
    intent: &'static str,
    args: &[&str],
) -> Result<[u32; N], IntentError> {
    if args.len() != N {
        return Err(IntentError::Arity {
            intent,
            expected: N,
            found: args.len(),
        });
    }

    let mut values = [0; N];
    for (slot, arg) in values.iter_mut().zip(args) {
        *slot = u32::from_str(arg).map_err(|_| IntentError::Number((*arg).to_owned()))?;
    }
    Ok(values)
}
