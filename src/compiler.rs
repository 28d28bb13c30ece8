//! Text to gesture-script translation
//!
//! Whole words are looked up first; anything else is spelled letter by
//! letter. Each sign is preceded by a text marker so the host shows the
//! symbol at the moment its gesture starts.

use crate::gesture::{Dictionary, GestureScript, SignEntry};
use crate::queue::AnimationQueue;

/// Translate free-form text into an ordered list of gesture scripts.
///
/// Characters with no letter sign are skipped; they never abort the rest of
/// the input.
pub fn compile(dictionary: &Dictionary, input: &str) -> Vec<GestureScript> {
    let upper = input.to_uppercase();
    let mut scripts = Vec::new();

    for word in upper.split_whitespace() {
        match dictionary.word(word) {
            Some(entry) => {
                scripts.push(GestureScript::TextMarker(format!("{} ", word)));
                scripts.extend(entry.scripts());
            }
            None => spell_word(dictionary, word, &mut scripts),
        }
    }

    scripts
}

/// Compile `input` and append the result to `queue`. Does not start playback.
pub fn compile_into(dictionary: &Dictionary, input: &str, queue: &mut AnimationQueue) -> usize {
    let scripts = compile(dictionary, input);
    let count = scripts.len();
    queue.extend(scripts);
    count
}

fn spell_word(dictionary: &Dictionary, word: &str, scripts: &mut Vec<GestureScript>) {
    let known: Vec<(char, &SignEntry)> = word
        .chars()
        .filter_map(|ch| match dictionary.letter(ch) {
            Some(entry) => Some((ch, entry)),
            None => {
                log::debug!("No sign for `{}`, skipping", ch);
                None
            }
        })
        .collect();

    // Trailing space goes on the last character that is actually signed
    let last = known.len().saturating_sub(1);
    for (index, (ch, entry)) in known.into_iter().enumerate() {
        let marker = if index == last {
            format!("{} ", ch)
        } else {
            ch.to_string()
        };
        scripts.push(GestureScript::TextMarker(marker));
        scripts.extend(entry.scripts());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::{Axis, Direction, JointInstruction};

    fn letter(joint: &str) -> SignEntry {
        SignEntry::single(vec![JointInstruction::rotate(
            joint,
            Axis::Z,
            1.0,
            Direction::Increase,
        )])
    }

    fn alphabet() -> Dictionary {
        Dictionary::new()
            .with_letter('H', letter("mixamorigRightHandIndex1"))
            .with_letter('I', letter("mixamorigRightHandPinky1"))
            .with_letter('O', letter("mixamorigRightHandThumb1"))
            .with_word("home", letter("mixamorigRightHand"))
    }

    fn markers(scripts: &[GestureScript]) -> Vec<&str> {
        scripts.iter().filter_map(GestureScript::as_text).collect()
    }

    #[test]
    fn test_spelled_word_interleaves_markers() {
        let dictionary = alphabet();
        let scripts = compile(&dictionary, "hi");

        assert_eq!(scripts.len(), 4);
        assert_eq!(scripts[0], GestureScript::text("H"));
        assert_eq!(
            scripts[1],
            GestureScript::motion(dictionary.letter('H').unwrap().phases()[0].clone())
        );
        assert_eq!(scripts[2], GestureScript::text("I "));
        assert_eq!(
            scripts[3],
            GestureScript::motion(dictionary.letter('I').unwrap().phases()[0].clone())
        );
    }

    #[test]
    fn test_whole_word_takes_precedence() {
        let scripts = compile(&alphabet(), "Home");

        assert_eq!(scripts.len(), 2);
        assert_eq!(markers(&scripts), vec!["HOME "]);
    }

    #[test]
    fn test_markers_follow_input_order() {
        let scripts = compile(&alphabet(), "oh  home\thi");
        assert_eq!(markers(&scripts), vec!["O", "H ", "HOME ", "H", "I "]);
    }

    #[test]
    fn test_unknown_characters_are_skipped() {
        let scripts = compile(&alphabet(), "h?i 42 o!");

        assert_eq!(markers(&scripts), vec!["H", "I ", "O "]);
        assert_eq!(scripts.len(), 6);
    }

    #[test]
    fn test_empty_and_unknown_input_compile_to_nothing() {
        assert!(compile(&alphabet(), "   ").is_empty());
        assert!(compile(&alphabet(), "xyz").is_empty());
    }

    #[test]
    fn test_compile_into_appends() {
        let mut queue = AnimationQueue::new();
        queue.push(GestureScript::text("earlier "));

        let added = compile_into(&alphabet(), "hi", &mut queue);

        assert_eq!(added, 4);
        assert_eq!(
            queue.text_markers().collect::<Vec<_>>(),
            vec!["earlier ", "H", "I "]
        );
    }
}
