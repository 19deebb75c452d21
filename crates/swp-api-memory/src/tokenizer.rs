// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

/// Lowercased alphanumeric words longer than two characters.
pub fn tokenize(text: &str) -> Vec<String> {
	text.to_lowercase()
		.split(|c: char| !c.is_alphanumeric())
		.filter(|word| word.chars().count() > 2)
		.map(String::from)
		.collect()
}

/// How many times `terms` occur among the words of `text`.
pub fn count_matches(terms: &[String], text: &str) -> usize {
	tokenize(text)
		.iter()
		.filter(|word| terms.contains(word))
		.count()
}
