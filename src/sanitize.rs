//! Приведение разметки ответа бэкенда к HTML, который принимает Telegram.
//!
//! Цепочка проходов с фиксированным порядком: сначала экранирование
//! служебных символов, затем синтез тегов, затем зачистка остатков
//! разметки. Порядок менять нельзя: например, зачистка скобок до
//! обработки ссылок ломает ссылки.

use std::sync::LazyLock;

use regex::{Captures, Regex};

// Готовые <pre>/<code>/<a> прячутся за маркерами из приватной зоны
// Unicode, чтобы поздние проходы не трогали их содержимое.
const STASH_OPEN: char = '\u{E000}';
const STASH_CLOSE: char = '\u{E001}';

static FENCED_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```[A-Za-z0-9_+\-]*\n?(.*?)```").unwrap());
static INLINE_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`\n]+)`").unwrap());
static BOLD_STARS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*([^*\n]+?)\*\*").unwrap());
static BOLD_UNDERSCORES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|[^\w])__([^_\n]+?)__($|[^\w])").unwrap());
static ITALIC_STAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*([^*\n]+?)\*").unwrap());
static ITALIC_UNDERSCORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|[^\w])_([^_\n]+?)_($|[^\w])").unwrap());
static UNDERLINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\+\+([^+\n]+?)\+\+").unwrap());
static STRIKE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"~~([^~\n]+?)~~").unwrap());
static HEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^#{1,6}[ \t]*").unwrap());
static LINK_OR_IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(!?)\[([^\]]*)\]\(([^)\s]*)\)").unwrap());
// Кавычка цитаты к этому моменту уже экранирована в &gt;
static BLOCK_QUOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(?:&gt;[ \t]?)+").unwrap());
static LEFTOVER_MARKUP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[*_~`\[\]]").unwrap());
static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*\n(?:[ \t]*\n)+").unwrap());

/// Переводит Markdown-подобный текст в безопасный Telegram-HTML.
/// Тотальная функция: кривая разметка деградирует до простого текста.
pub fn sanitize(text: &str) -> String {
    let mut stash: Vec<String> = Vec::new();

    // Экранирование идёт первым, чтобы синтезированные дальше теги
    // не экранировались сами.
    let mut out = escape_html(text);

    out = FENCED_CODE
        .replace_all(&out, |c: &Captures| {
            stash_put(&mut stash, format!("<pre>{}</pre>", &c[1]))
        })
        .into_owned();
    out = INLINE_CODE
        .replace_all(&out, |c: &Captures| {
            stash_put(&mut stash, format!("<code>{}</code>", &c[1]))
        })
        .into_owned();

    out = BOLD_STARS.replace_all(&out, "<b>$1</b>").into_owned();
    out = BOLD_UNDERSCORES.replace_all(&out, "$1<b>$2</b>$3").into_owned();
    out = ITALIC_STAR.replace_all(&out, "<i>$1</i>").into_owned();
    out = ITALIC_UNDERSCORE.replace_all(&out, "$1<i>$2</i>$3").into_owned();
    out = UNDERLINE.replace_all(&out, "<u>$1</u>").into_owned();
    out = STRIKE.replace_all(&out, "<s>$1</s>").into_owned();
    out = HEADING.replace_all(&out, "").into_owned();

    out = LINK_OR_IMAGE
        .replace_all(&out, |c: &Captures| {
            if &c[1] == "!" {
                // Картинки отбрасываются целиком, включая alt-текст
                return String::new();
            }
            let label = c[2].to_string();
            let url = &c[3];
            if has_safe_scheme(url) {
                stash_put(
                    &mut stash,
                    format!(r#"<a href="{}">{}</a>"#, escape_href(url), label),
                )
            } else {
                // Небезопасная схема: остаётся только текст ссылки
                label
            }
        })
        .into_owned();

    out = BLOCK_QUOTE.replace_all(&out, "").into_owned();
    out = LEFTOVER_MARKUP.replace_all(&out, "").into_owned();
    out = BLANK_LINES.replace_all(&out, "\n\n").into_owned();

    let mut out = out.trim().to_string();
    for (idx, element) in stash.iter().enumerate() {
        out = out.replace(&stash_key(idx), element);
    }
    out
}

fn stash_put(stash: &mut Vec<String>, element: String) -> String {
    stash.push(element);
    stash_key(stash.len() - 1)
}

fn stash_key(idx: usize) -> String {
    format!("{STASH_OPEN}{idx}{STASH_CLOSE}")
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn has_safe_scheme(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("mailto:")
}

// & < > в значении href уже экранированы первым проходом,
// осталась только кавычка.
fn escape_href(url: &str) -> String {
    url.replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_only_trimmed() {
        assert_eq!(sanitize("  Просто текст.  "), "Просто текст.");
        assert_eq!(sanitize("Две строки\nбез разметки"), "Две строки\nбез разметки");
    }

    #[test]
    fn escapes_reserved_characters() {
        assert_eq!(sanitize("a < b & c > d"), "a &lt; b &amp; c &gt; d");
        assert_eq!(
            sanitize("<script>alert(1)</script>"),
            "&lt;script&gt;alert(1)&lt;/script&gt;"
        );
    }

    #[test]
    fn converts_basic_emphasis() {
        assert_eq!(sanitize("**жирный**"), "<b>жирный</b>");
        assert_eq!(sanitize("__жирный__"), "<b>жирный</b>");
        assert_eq!(sanitize("*курсив*"), "<i>курсив</i>");
        assert_eq!(sanitize("_курсив_"), "<i>курсив</i>");
        assert_eq!(sanitize("++подчёркнутый++"), "<u>подчёркнутый</u>");
        assert_eq!(sanitize("~~зачёркнутый~~"), "<s>зачёркнутый</s>");
    }

    #[test]
    fn converts_code_spans() {
        assert_eq!(sanitize("вот `код` тут"), "вот <code>код</code> тут");
        assert_eq!(sanitize("```\nlet x = 1;\n```"), "<pre>let x = 1;\n</pre>");
    }

    #[test]
    fn code_block_content_stays_verbatim() {
        assert_eq!(
            sanitize("```\n**не жирный** _и не курсив_\n```"),
            "<pre>**не жирный** _и не курсив_\n</pre>"
        );
        assert_eq!(sanitize("`a < b && c`"), "<code>a &lt; b &amp;&amp; c</code>");
    }

    #[test]
    fn safe_links_become_anchors() {
        assert_eq!(
            sanitize("[сайт](https://example.com/page)"),
            r#"<a href="https://example.com/page">сайт</a>"#
        );
        assert_eq!(
            sanitize("[почта](mailto:info@example.com)"),
            r#"<a href="mailto:info@example.com">почта</a>"#
        );
    }

    #[test]
    fn scheme_check_is_case_insensitive() {
        assert_eq!(
            sanitize("[x](HTTPS://example.com)"),
            r#"<a href="HTTPS://example.com">x</a>"#
        );
    }

    #[test]
    fn unsafe_scheme_degrades_to_plain_text() {
        let out = sanitize("[нажми](javascript:alert)");
        assert_eq!(out, "нажми");
        assert!(!out.contains("<a"));
        assert!(!sanitize("[f](ftp://host/file)").contains("<a"));
    }

    #[test]
    fn href_with_query_survives_later_passes() {
        assert_eq!(
            sanitize("[поиск](https://example.com/?q=1&lang=ru)"),
            r#"<a href="https://example.com/?q=1&amp;lang=ru">поиск</a>"#
        );
    }

    #[test]
    fn images_are_discarded_entirely() {
        assert_eq!(sanitize("до ![картинка](https://x/i.png) после"), "до  после");
    }

    #[test]
    fn headings_and_quotes_are_stripped() {
        assert_eq!(sanitize("# Заголовок\nтекст"), "Заголовок\nтекст");
        assert_eq!(sanitize("### Ещё один"), "Ещё один");
        assert_eq!(sanitize("> цитата\nобычная строка"), "цитата\nобычная строка");
        assert_eq!(sanitize(">> вложенная"), "вложенная");
    }

    #[test]
    fn leftover_markup_is_stripped() {
        assert_eq!(sanitize("список [пунктов]"), "список пунктов");
        assert_eq!(sanitize("нечётная * звёздочка"), "нечётная  звёздочка");
    }

    #[test]
    fn blank_runs_collapse_to_one_blank_line() {
        assert_eq!(sanitize("a\n\n\n\nb"), "a\n\nb");
        assert_eq!(sanitize("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn mixed_document_has_no_raw_angle_brackets() {
        let out = sanitize(
            "# План\n\n**День 1**: музей <платно> & парк\n\n\
             [билеты](https://example.com)\n[зло](javascript:x)\n\n\n```\nif a < b { }\n```",
        );
        assert!(!out.contains("<script"));
        assert!(!out.contains("<платно>"));
        assert!(out.contains("&lt;платно&gt;"));
        assert!(out.contains("<b>День 1</b>"));
        assert!(out.contains(r#"<a href="https://example.com">билеты</a>"#));
        assert!(!out.contains("javascript"));
        assert!(out.contains("<pre>if a &lt; b { }\n</pre>"));
    }
}
