use crate::dictionary::DictionaryEntry;

const INDEX_HTML: &str = include_str!("../templates/index.html");
const DICT_HTML: &str = include_str!("../templates/dict.html");

pub fn index() -> &'static str {
    INDEX_HTML
}

pub fn dictionary_entry(entry: &DictionaryEntry) -> String {
    DICT_HTML
        .replace("{{word}}", &escape_html(&entry.word))
        .replace("{{definition}}", &escape_html(&entry.definition))
        .replace("{{audio_file}}", &escape_html(&entry.audio_file))
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
