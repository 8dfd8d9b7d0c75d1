use crate::{SanitizeResult, WipeMethod};
use std::io::{self, BufRead, Write};

/// Asks the operator to approve a destructive erase
pub trait Confirmer {
    fn confirm(&self, device: &str, method: WipeMethod) -> SanitizeResult<bool>;
}

/// Reads the answer from stdin. Only the exact token `YES` approves.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalConfirmer;

impl Confirmer for TerminalConfirmer {
    fn confirm(&self, device: &str, method: WipeMethod) -> SanitizeResult<bool> {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stdout();
        ask(&mut input, &mut output, device, method)
    }
}

pub(crate) fn ask(
    input: &mut impl BufRead,
    output: &mut impl Write,
    device: &str,
    method: WipeMethod,
) -> SanitizeResult<bool> {
    write!(
        output,
        "WARNING: This will ERASE all data on {} using {}.\nType 'YES' to continue: ",
        device, method
    )?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim() == "YES")
}
