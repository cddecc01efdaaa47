//! Translated UI strings. `t!("key")` looks the key up in the active
//! language, then in English, then falls back to the key itself.

use std::collections::HashMap;
use std::sync::Mutex;

type Strings = HashMap<&'static str, &'static str>;

/// Embedded `key=value` tables; the first entry is the fallback language.
const LOCALES: &[(&str, &str)] = &[
    ("en", include_str!("../locales/en.txt")),
    ("de", include_str!("../locales/de.txt")),
];

struct Catalog {
    active: usize,
    tables: Vec<Strings>,
}

static CATALOG: Mutex<Option<Catalog>> = Mutex::new(None);

/// Parse the embedded tables with English active. Call once at startup.
pub fn init() {
    let tables = LOCALES.iter().map(|&(_, data)| parse_translations(data)).collect();
    if let Ok(mut guard) = CATALOG.lock() {
        *guard = Some(Catalog { active: 0, tables });
    }
}

/// Switch to `code`; an empty code picks the system language and unknown
/// codes fall back to English.
pub fn set_language(code: &str) {
    let index = if code.is_empty() {
        system_locale_index()
    } else {
        locale_index(code).unwrap_or_else(|| {
            log_warn!("Unknown language '{}', using English", code);
            0
        })
    };
    if let Ok(mut guard) = CATALOG.lock()
        && let Some(catalog) = guard.as_mut()
    {
        catalog.active = index;
        log_info!("Language: {}", LOCALES[index].0);
    }
}

pub fn translate(key: &str) -> String {
    if let Ok(guard) = CATALOG.lock()
        && let Some(catalog) = guard.as_ref()
        && let Some(val) = [catalog.active, 0]
            .iter()
            .find_map(|&i| catalog.tables[i].get(key))
    {
        return val.to_string();
    }
    key.to_string()
}

fn locale_index(code: &str) -> Option<usize> {
    LOCALES.iter().position(|(c, _)| c.eq_ignore_ascii_case(code))
}

fn system_locale_index() -> usize {
    ["LANG", "LC_ALL", "LC_MESSAGES", "LANGUAGE"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find_map(|val| match_system_locale(&val))
        .unwrap_or(0)
}

/// "de_DE.UTF-8", "en-GB" and the like to a `LOCALES` index.
fn match_system_locale(locale: &str) -> Option<usize> {
    let primary = locale
        .split(['.', '@'])
        .next()?
        .split(['_', '-'])
        .next()?;
    locale_index(primary)
}

/// One `key=value` per line; `#` starts a comment line.
fn parse_translations(data: &'static str) -> Strings {
    data.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, val)| (key.trim(), val.trim()))
        .collect()
}

/// Translation macro. Usage: `t!("tool.fill")` or `t!("title.format", app = "PixelFE")`
#[macro_export]
macro_rules! t {
    ($key:expr) => {
        $crate::i18n::translate($key)
    };
    ($key:expr, $($name:ident = $val:expr),+ $(,)?) => {{
        let mut s = $crate::i18n::translate($key);
        $(
            s = s.replace(concat!("{", stringify!($name), "}"), &format!("{}", $val));
        )+
        s
    }};
}
