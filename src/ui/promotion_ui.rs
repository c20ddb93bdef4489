//! Pawn promotion prompt
//!
//! Asks the player on the terminal which piece a pawn becomes. An empty
//! answer or end of input declines, which withdraws the move.

use std::cell::RefCell;
use std::io::{self, BufRead, Write};
use std::rc::Rc;

use chess_rules::{PieceKind, PromotionChooser, PromotionRequest};
use tracing::warn;

/// Invalid answers tolerated before the prompt gives up
const MAX_ATTEMPTS: usize = 3;

/// Parse a promotion answer: a letter or a piece name, any case
pub fn parse_choice(answer: &str) -> Option<PieceKind> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "q" | "queen" => Some(PieceKind::Queen),
        "r" | "rook" => Some(PieceKind::Rook),
        "b" | "bishop" => Some(PieceKind::Bishop),
        "n" | "knight" => Some(PieceKind::Knight),
        _ => None,
    }
}

/// Prompts on `output`, reading answers from the input the session reads
///
/// Must share the session's reader: stdin's lock is not re-entrant.
pub struct PromptPromotion<R, W> {
    input: Rc<RefCell<R>>,
    output: W,
}

impl<R: BufRead, W: Write> PromptPromotion<R, W> {
    pub fn new(input: Rc<RefCell<R>>, output: W) -> Self {
        Self { input, output }
    }
}

fn ask(
    request: &PromotionRequest,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> io::Result<Option<PieceKind>> {
    for _ in 0..MAX_ATTEMPTS {
        write!(
            output,
            "{} pawn promotes on {}. Choose [Q]ueen, [R]ook, [B]ishop or k[N]ight: ",
            request.player, request.to
        )?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 || line.trim().is_empty() {
            return Ok(None);
        }
        if let Some(kind) = parse_choice(&line) {
            return Ok(Some(kind));
        }
        writeln!(output, "'{}' is not a promotion piece.", line.trim())?;
    }
    Ok(None)
}

impl<R: BufRead, W: Write> PromotionChooser for PromptPromotion<R, W> {
    fn choose(&mut self, request: &PromotionRequest) -> Option<PieceKind> {
        let Ok(mut input) = self.input.try_borrow_mut() else {
            warn!("[PROMOTION] Input is busy, declining the promotion on {}", request.to);
            return None;
        };
        match ask(request, &mut *input, &mut self.output) {
            Ok(choice) => choice,
            Err(e) => {
                warn!("[PROMOTION] Prompt failed: {}", e);
                None
            }
        }
    }
}
