//! File name display helpers. A leading `=` marks a file opened read-only.

use std::path::{MAIN_SEPARATOR, Path};

fn prettify_plain_file_name(name: &str, work_dir: Option<&Path>) -> String {
    let stripped = work_dir
        .and_then(|dir| {
            let mut prefix = dir.to_string_lossy().into_owned();
            if !prefix.ends_with('/') {
                prefix.push('/');
            }
            name.strip_prefix(prefix.as_str()).map(str::to_string)
        })
        .unwrap_or_else(|| name.to_string());
    stripped.replace('/', &MAIN_SEPARATOR.to_string())
}

/// File name relative to the current directory when it lies below it,
/// keeping a read-only marker.
pub fn prettify_file_name(name: &str) -> String {
    let work_dir = std::env::current_dir().ok();
    prettify_file_name_in(name, work_dir.as_deref())
}

pub fn prettify_file_name_in(name: &str, work_dir: Option<&Path>) -> String {
    match name.strip_prefix('=') {
        Some(rest) => format!("={}", prettify_plain_file_name(rest, work_dir)),
        None => prettify_plain_file_name(name, work_dir),
    }
}

pub fn prettify_file_names(names: &[String]) -> Vec<String> {
    names.iter().map(|n| prettify_file_name(n)).collect()
}

fn strip_marker(name: &str) -> Vec<char> {
    name.strip_prefix('=').unwrap_or(name).chars().collect()
}

/// Joins file names into one short label by factoring out the common
/// prefix and suffix, cut back to word boundaries:
/// `["app_de.ts", "=app_fr.ts"]` becomes `app_{de,=fr}.ts`.
pub fn condense_file_names(names: &[String]) -> String {
    match names {
        [] => return String::new(),
        [only] => return only.clone(),
        _ => {}
    }

    let mut prefix = strip_marker(&names[0]);
    let mut suffix = prefix.clone();
    for name in &names[1..] {
        let name = strip_marker(name);

        if let Some(mut j) = (0..prefix.len()).find(|&j| name.get(j) != Some(&prefix[j])) {
            while j > 0 && prefix[j - 1].is_alphanumeric() {
                j -= 1;
            }
            prefix.truncate(j);
        }

        let mismatch = (0..suffix.len()).find(|&k| {
            k >= name.len() || name[name.len() - 1 - k] != suffix[suffix.len() - 1 - k]
        });
        if let Some(mut k) = mismatch {
            // keep the last k chars, starting at a word boundary
            while k > 0 && suffix[suffix.len() - k].is_alphanumeric() {
                k -= 1;
            }
            if k > 0 && prefix.len() + k >= name.len() {
                k -= 1;
            }
            suffix.drain(..suffix.len() - k);
        }
    }

    let mut out: String = prefix.iter().collect();
    out.push('{');
    for (i, name) in names.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        let chars: Vec<char> = name.chars().collect();
        let mut start = prefix.len();
        if name.starts_with('=') {
            out.push('=');
            start += 1;
        }
        let end = chars.len().saturating_sub(suffix.len());
        if start < end {
            out.extend(&chars[start..end]);
        }
    }
    out.push('}');
    out.extend(&suffix);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_condense_language_variants() {
        assert_eq!(
            condense_file_names(&names(&["app_de.ts", "app_fr.ts"])),
            "app_{de,fr}.ts"
        );
        assert_eq!(
            condense_file_names(&names(&["/src/app_de.ts", "=/src/app_pt_BR.ts"])),
            "/src/app_{de,=pt_BR}.ts"
        );
    }

    #[test]
    fn test_condense_trivial_lists() {
        assert_eq!(condense_file_names(&[]), "");
        assert_eq!(condense_file_names(&names(&["=one.ts"])), "=one.ts");
    }

    #[test]
    fn test_condense_unrelated_names() {
        assert_eq!(condense_file_names(&names(&["a.ts", "b.qph"])), "{a.ts,b.qph}");
    }

    #[test]
    fn test_prettify() {
        let dir = Path::new("/work/project");
        assert_eq!(
            prettify_file_name_in("/work/project/i18n/app_de.ts", Some(dir)),
            format!("i18n{}app_de.ts", MAIN_SEPARATOR)
        );
        assert_eq!(
            prettify_file_name_in("=/work/project/app_fr.ts", Some(dir)),
            "=app_fr.ts"
        );
        assert_eq!(prettify_file_name_in("/elsewhere/x.ts", Some(dir)), format!("{0}elsewhere{0}x.ts", MAIN_SEPARATOR));
    }
}
