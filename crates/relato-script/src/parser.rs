//! Script markup parsing.
//!
//! Grammar, one tag per line:
//! - `[SPEAKER]` sets the current speaker; narration lines accumulate
//!   until the next speaker tag flushes the block.
//! - `[imagen:file]` activates a sticky visual for this and following
//!   blocks until changed; `clear`/`none`/`off`/`0`/`null` clears it.
//! - `[CIERRE]` / `[CLOSE]` flushes and appends the closing sentinel.
//! - Metadata tags (`SFX`, `AMBIENTE`, `NOTA`, ...) are ignored and
//!   never change the speaker or visual.
//! - Malformed tags are inert and treated as narration text.

use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

use relato_models::Turn;

use crate::error::{ScriptError, ScriptResult};

/// Tag prefixes that are metadata, not speakers.
const META_PREFIXES: &[&str] = &["SFX", "AMB", "AMBIENTE", "FX", "NOTA", "MÚSICA", "MUSICA"];

/// Prefix of visual tags; matches both `imagen:` and `image:`.
const IMAGE_PREFIX: &str = "IMAGE";

/// Values that clear the active sticky visual.
const CLEAR_VALUES: &[&str] = &["clear", "none", "off", "0", "null"];

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*\[(.+?)\]\s*$").expect("valid tag regex"))
}

fn normalize_dashes(s: &str) -> String {
    s.replace(['–', '—'], "-")
}

fn looks_meta(head: &str) -> bool {
    let head_up = head.to_uppercase();
    META_PREFIXES.iter().any(|p| head_up.starts_with(p))
}

/// Normalize a speaker tag: uppercase, first segment before `-`.
/// Returns `None` for metadata and visual tags.
fn normalize_speaker(inside: &str) -> Option<String> {
    let t = normalize_dashes(inside.trim());
    if let Some((head, _)) = t.split_once(':') {
        let head = head.trim();
        if looks_meta(head) || head.to_uppercase().starts_with(IMAGE_PREFIX) {
            return None;
        }
    }
    let main = t.split('-').next().unwrap_or("").trim();
    if main.is_empty() || looks_meta(main) {
        return None;
    }
    Some(main.to_uppercase())
}

/// Outcome of a visual tag.
#[derive(Debug, Clone, PartialEq, Eq)]
enum VisualTag {
    Set(String),
    Clear,
}

/// Extract a visual tag value, normalizing bare `Npng`/`Njpg`/`Npeg`
/// shorthands to proper extensions. `[imagen:]` with no value is inert.
fn extract_visual(inside: &str) -> Option<VisualTag> {
    let t = normalize_dashes(inside.trim());
    let (head, val) = t.split_once(':')?;
    if !head.trim().to_uppercase().starts_with(IMAGE_PREFIX) {
        return None;
    }
    let val = val.trim();
    if val.is_empty() {
        return None;
    }
    if CLEAR_VALUES.contains(&val.to_lowercase().as_str()) {
        return Some(VisualTag::Clear);
    }
    let mut name = val.to_string();
    if !name.contains('.') && name.len() > 3 && name.is_char_boundary(name.len() - 3) {
        let (stem, tail) = name.split_at(name.len() - 3);
        let tail = tail.to_lowercase();
        if matches!(tail.as_str(), "png" | "jpg" | "peg") {
            name = format!("{}.{}", stem, tail);
        }
    }
    if name.to_lowercase().ends_with(".peg") {
        let stem = &name[..name.len() - 4];
        name = format!("{}.jpeg", stem);
    }
    Some(VisualTag::Set(name))
}

/// Accumulator state for the line fold.
#[derive(Debug, Default)]
struct ParserState {
    turns: Vec<Turn>,
    current_speaker: Option<String>,
    /// Sticky visual active for the next flushed block.
    active_visual: Option<String>,
    buffer: Vec<String>,
    /// Speaker to restore for orphan text after meta tags.
    last_speaker: Option<String>,
}

impl ParserState {
    /// Emit the pending block if it has a speaker and non-empty text.
    /// The block snapshots the visual active at flush time, so a visual
    /// tag appearing mid-buffer still applies to it.
    fn flush(&mut self) {
        let text = self.buffer.join("\n").trim().to_string();
        if let Some(speaker) = &self.current_speaker {
            if !text.is_empty() {
                self.turns.push(Turn {
                    index: self.turns.len(),
                    speaker: speaker.clone(),
                    text,
                    image: self.active_visual.clone(),
                });
            }
        }
        self.buffer.clear();
    }

    fn line(&mut self, raw: &str) {
        let Some(caps) = tag_regex().captures(raw) else {
            if self.current_speaker.is_none() && self.last_speaker.is_some() {
                self.current_speaker = self.last_speaker.clone();
            }
            self.buffer.push(raw.to_string());
            return;
        };
        let inside = caps[1].trim().to_string();

        let upper = inside.to_uppercase();
        if upper == "CIERRE" || upper == "CLOSE" {
            self.flush();
            let idx = self.turns.len();
            self.turns.push(Turn::close_sentinel(idx));
            return;
        }

        if let Some(tag) = extract_visual(&inside) {
            match tag {
                VisualTag::Set(name) => {
                    debug!(visual = %name, "Sticky visual set");
                    self.active_visual = Some(name);
                }
                VisualTag::Clear => {
                    debug!("Sticky visual cleared");
                    self.active_visual = None;
                }
            }
            if self.current_speaker.is_some() {
                self.last_speaker = self.current_speaker.clone();
            }
            return;
        }

        if let Some(speaker) = normalize_speaker(&inside) {
            self.flush();
            self.current_speaker = Some(speaker.clone());
            self.last_speaker = Some(speaker);
        } else if self.current_speaker.is_some() {
            // Metadata tag: remember the speaker, drop the tag.
            self.last_speaker = self.current_speaker.clone();
        }
    }

    fn finish(mut self) -> Vec<Turn> {
        self.flush();
        self.turns
    }
}

/// Parse raw script markup into ordered turns.
pub fn parse_script(text: &str) -> Vec<Turn> {
    let mut state = ParserState::default();
    for raw in text.lines() {
        state.line(raw);
    }
    let turns = state.finish();
    debug!(turns = turns.len(), "Script parsed");
    turns
}

/// Parse a UTF-8 script file into ordered turns.
pub fn parse_script_file(path: impl AsRef<Path>) -> ScriptResult<Vec<Turn>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ScriptError::FileNotFound(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path)?;
    Ok(parse_script(&text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use relato_models::CLOSE_SPEAKER;

    #[test]
    fn test_basic_turns() {
        let turns = parse_script(
            "[NARRADOR]\nHabía una vez.\n[MUJER30]\nUn extraño sonido.\n",
        );
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].speaker, "NARRADOR");
        assert_eq!(turns[0].text, "Había una vez.");
        assert_eq!(turns[0].index, 0);
        assert_eq!(turns[1].speaker, "MUJER30");
        assert_eq!(turns[1].index, 1);
    }

    #[test]
    fn test_sticky_visual_carries_forward() {
        let turns = parse_script(
            "[imagen:1.png]\n[NARRADOR]\nUno.\n[NARRADOR]\nDos.\n[imagen:2.png]\n[NARRADOR]\nTres.\n",
        );
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[0].image.as_deref(), Some("1.png"));
        assert_eq!(turns[1].image.as_deref(), Some("1.png"));
        assert_eq!(turns[2].image.as_deref(), Some("2.png"));
    }

    #[test]
    fn test_visual_tag_mid_buffer_applies_to_pending_block() {
        // The visual changes before the block flushes, so the block
        // carries the new visual.
        let turns = parse_script("[NARRADOR]\nTexto.\n[imagen:5.png]\n[OTRO]\nMás.\n");
        assert_eq!(turns[0].image.as_deref(), Some("5.png"));
    }

    #[test]
    fn test_clear_visual() {
        let turns = parse_script(
            "[imagen:1.png]\n[NARRADOR]\nUno.\n[imagen:clear]\n[NARRADOR]\nDos.\n[NARRADOR]\nTres.\n",
        );
        // "clear" lands before the first flush, so even the first turn loses it.
        assert_eq!(turns[0].image, None);
        assert_eq!(turns[1].image, None);
        assert_eq!(turns[2].image, None);
    }

    #[test]
    fn test_clear_between_blocks() {
        let turns = parse_script(
            "[imagen:1.png]\n[A]\nUno.\n[B]\nDos.\n[imagen:none]\n[C]\nTres.\n",
        );
        assert_eq!(turns[0].image.as_deref(), Some("1.png"));
        // The B block flushes when [C] arrives, after the clear.
        assert_eq!(turns[1].image, None);
        assert_eq!(turns[2].image, None);
    }

    #[test]
    fn test_shorthand_extension() {
        let turns = parse_script("[imagen:2png]\n[A]\nX.\n");
        assert_eq!(turns[0].image.as_deref(), Some("2.png"));

        let turns = parse_script("[imagen:7jpg]\n[A]\nX.\n");
        assert_eq!(turns[0].image.as_deref(), Some("7.jpg"));

        let turns = parse_script("[imagen:3peg]\n[A]\nX.\n");
        assert_eq!(turns[0].image.as_deref(), Some("3.jpeg"));

        let turns = parse_script("[imagen:foto.peg]\n[A]\nX.\n");
        assert_eq!(turns[0].image.as_deref(), Some("foto.jpeg"));
    }

    #[test]
    fn test_empty_visual_value_is_inert() {
        let turns = parse_script("[imagen:1.png]\n[A]\nX.\n[imagen:]\n[B]\nY.\n");
        assert_eq!(turns[1].image.as_deref(), Some("1.png"));
    }

    #[test]
    fn test_meta_tags_ignored() {
        let turns = parse_script(
            "[NARRADOR]\nUno.\n[SFX: trueno]\nDos.\n[Ambiente: lluvia]\n[NOTA: pausa]\nTres.\n",
        );
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].speaker, "NARRADOR");
        assert_eq!(turns[0].text, "Uno.\nDos.\nTres.");
    }

    #[test]
    fn test_speaker_dash_suffix_normalized() {
        let turns = parse_script("[narrador - susurrando]\nUno.\n[CLOSE]\n");
        assert_eq!(turns[0].speaker, "NARRADOR");
    }

    #[test]
    fn test_close_sentinel() {
        let turns = parse_script("[NARRADOR]\nFin.\n[CIERRE]\n");
        assert_eq!(turns.len(), 2);
        assert!(turns[1].is_close());
        assert_eq!(turns[1].speaker, CLOSE_SPEAKER);

        let turns = parse_script("[NARRADOR]\nFin.\n[CLOSE]\n");
        assert!(turns[1].is_close());
    }

    #[test]
    fn test_close_flushes_pending_block() {
        let turns = parse_script("[NARRADOR]\nPendiente.\n[CIERRE]\n");
        assert_eq!(turns[0].text, "Pendiente.");
        assert!(turns[1].is_close());
    }

    #[test]
    fn test_malformed_tags_are_text() {
        let turns = parse_script("[NARRADOR]\n[sin cierre\nnormal.\n");
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].text, "[sin cierre\nnormal.");
    }

    #[test]
    fn test_no_speaker_no_turns() {
        let turns = parse_script("solo texto\nsin etiquetas\n");
        assert!(turns.is_empty());
    }

    #[test]
    fn test_turn_count_matches_speaker_transitions() {
        let turns = parse_script(
            "[A]\nuno\n[B]\ndos\n[C]\n\n[D]\ntres\n",
        );
        // [C] has an empty buffer when [D] arrives, so it emits nothing.
        assert_eq!(turns.len(), 3);
        let speakers: Vec<_> = turns.iter().map(|t| t.speaker.as_str()).collect();
        assert_eq!(speakers, vec!["A", "B", "D"]);
    }

    #[test]
    fn test_parse_file_missing() {
        let err = parse_script_file("/nonexistent/script.txt").unwrap_err();
        assert!(matches!(err, ScriptError::FileNotFound(_)));
    }

    #[test]
    fn test_parse_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guion.txt");
        std::fs::write(&path, "[imagen:1.png]\n[NARRADOR]\nHola.\n[CIERRE]\n").unwrap();
        let turns = parse_script_file(&path).unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].image.as_deref(), Some("1.png"));
    }
}
