// CarShop
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Trivial templating engine for the static pages served by the frontend.

/// Performs named string replacements in `input` based on `replacements`.
///
/// The `input` string can have `%key%` strings in it where `key` must appear in `replacements` and
/// which will be replaced by its corresponding value.  Raw `%` characters can be escaped via `%%`
/// and nested expansions are not supported.
///
/// Templates are embedded in the binary, so a reference to an undefined key or a dangling `%` is
/// a programming error and causes a panic.
pub fn apply(input: &str, replacements: &[(&str, &str)]) -> String {
    let mut output = String::with_capacity(input.len());
    let mut chunks = input.split('%');

    // Chunks alternate between literal text and keys, starting with text.
    if let Some(text) = chunks.next() {
        output.push_str(text);
    }
    while let Some(key) = chunks.next() {
        let text = chunks.next().unwrap_or_else(|| panic!("Unterminated key '{}'", key));

        if key.is_empty() {
            output.push('%');
        } else {
            let mut values = replacements.iter().filter(|(k, _)| *k == key).map(|(_, v)| v);
            let value = values.next().unwrap_or_else(|| panic!("No replacement for {}", key));
            assert!(values.next().is_none(), "Found two values for replacement {}", key);
            output.push_str(value);
        }
        output.push_str(text);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_empty() {
        assert_eq!("", apply("", &[]));
    }

    #[test]
    fn test_apply_escapes() {
        assert_eq!("100% sure, 50%", apply("100%% sure, 50%%", &[]));
    }

    #[test]
    fn test_apply_some() {
        let replacements = &[("YEAR_MIN", "1900"), ("YEAR_MAX", "2100")];
        assert_eq!("19002100", apply("%YEAR_MIN%%YEAR_MAX%", replacements));
        assert_eq!(
            "<input min=\"1900\" max=\"2100\">",
            apply("<input min=\"%YEAR_MIN%\" max=\"%YEAR_MAX%\">", replacements)
        );
    }

    #[test]
    fn test_apply_no_nested_replacements() {
        let replacements = &[("a", "%nested% chunk")];
        assert_eq!("the %nested% chunk output", apply("the %a% output", replacements));
    }

    #[test]
    #[should_panic(expected = "No replacement for missing")]
    fn test_apply_missing_key() {
        apply("a %missing% key", &[]);
    }

    #[test]
    #[should_panic(expected = "Found two values for replacement a")]
    fn test_apply_duplicate_key() {
        apply("%a%", &[("a", "1"), ("a", "2")]);
    }

    #[test]
    #[should_panic(expected = "Unterminated key")]
    fn test_apply_unterminated() {
        apply("50% off", &[]);
    }
}
