//! Greedy word wrap against a caller-supplied width measure.

/// Splits `text` into lines no wider than `max_width` according to `measure`.
///
/// Words are joined with single spaces while they fit. A word that is wider than `max_width` on its
/// own is cut into the longest fitting character runs; the last run stays open so following words
/// can join it. A single character wider than `max_width` still gets a line of its own.
///
/// Empty or all-whitespace text gives no lines.
pub fn wrap<M>(text: &str, max_width: f32, measure: M) -> Vec<String>
where
	M: Fn(&str) -> f32, {
	let mut lines = Vec::new();
	let mut current = String::new();

	for word in text.split_whitespace() {
		let candidate = if current.is_empty() { word.to_owned() } else { format!("{current} {word}") };
		if measure(&candidate) <= max_width {
			current = candidate;
			continue;
		}

		if !current.is_empty() {
			lines.push(std::mem::take(&mut current));
		}

		if measure(word) <= max_width {
			current = word.to_owned();
		} else {
			let mut chunks = split_long(word, max_width, &measure);
			current = chunks.pop().unwrap_or_default();
			lines.extend(chunks);
		}
	}

	if !current.is_empty() {
		lines.push(current);
	}
	lines
}

/// Cuts `word` into maximal runs of characters that fit `max_width`.
fn split_long<M>(word: &str, max_width: f32, measure: &M) -> Vec<String>
where
	M: Fn(&str) -> f32, {
	let mut chunks = Vec::new();
	let mut chunk = String::new();
	for ch in word.chars() {
		chunk.push(ch);
		if measure(&chunk) > max_width && chunk.chars().count() > 1 {
			chunk.pop();
			chunks.push(std::mem::take(&mut chunk));
			chunk.push(ch);
		}
	}
	if !chunk.is_empty() {
		chunks.push(chunk);
	}
	chunks
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::prng;

	fn mono(s: &str) -> f32 {
		s.chars().count() as f32 * 10.0
	}

	#[test]
	fn empty_text_has_no_lines() {
		assert!(wrap("", 100.0, mono).is_empty());
		assert!(wrap("  \n\t ", 100.0, mono).is_empty());
	}

	#[test]
	fn greedy_fill() {
		let lines = wrap("the quick brown fox jumps over the lazy dog", 100.0, mono);
		assert_eq!(lines, ["the quick", "brown fox", "jumps over", "the lazy", "dog"]);
	}

	#[test]
	fn collapses_whitespace() {
		assert_eq!(wrap("  a\n\n b\tc  ", 1000.0, mono), ["a b c"]);
	}

	#[test]
	fn long_token_is_split_and_tail_stays_open() {
		let lines = wrap("see https://example.com/a/very/long/path ok", 100.0, mono);
		assert_eq!(lines, ["see", "https://ex", "ample.com/", "a/very/lon", "g/path ok"]);
	}

	#[test]
	fn oversize_single_char_gets_own_line() {
		let wide = |s: &str| s.chars().count() as f32 * 50.0;
		assert_eq!(wrap("abc", 30.0, wide), ["a", "b", "c"]);
	}

	#[test]
	fn lines_fit_and_tokens_survive() {
		let alphabet: Vec<char> = "abcdefghij klmnop qrstuvwxyz  .,!?".chars().collect();
		for case in 0..300_i64 {
			let len = prng::index(case * 7 + 1, 120);
			let text: String = (0..len).map(|i| alphabet[prng::index(case * 1_000 + i as i64, alphabet.len())]).collect();
			let max_width = prng::range(case * 3 + 2, 20.0, 200.0) as f32;

			let lines = wrap(&text, max_width, mono);
			for line in &lines {
				assert!(mono(line) <= max_width, "{line:?} wider than {max_width}");
			}

			// Rejoining must reproduce the tokens, modulo forced splits of oversize words
			let tokens: String = text.split_whitespace().collect();
			let rebuilt: String = lines.iter().flat_map(|l| l.split_whitespace()).collect();
			assert_eq!(rebuilt, tokens);
			let fitting: Vec<&str> = text.split_whitespace().filter(|w| mono(w) <= max_width).collect();
			let emitted: Vec<&str> = lines.iter().flat_map(|l| l.split_whitespace()).collect();
			for word in fitting {
				assert!(emitted.contains(&word), "fitting word {word:?} was split");
			}
		}
	}
}
