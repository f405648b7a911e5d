//! Rule removal over the lightningcss AST

use lightningcss::{
    properties::Property,
    rules::{CssRule, CssRuleList, keyframes::KeyframesName},
    stylesheet::{ParserOptions, PrinterOptions, StyleSheet},
    traits::ToCss,
};
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::error::{PurgeError, Result};
use crate::options::{PurgeOptions, PurgeResult, RawCss};
use crate::selector::{SelectorPart, selector_parts, split_selector_list};

/// Attribute selectors that depend on runtime state and are never removed
const ALWAYS_KEPT_ATTRIBUTES: &[&str] = &["value", "checked", "selected", "open"];

/// Purge a single stylesheet against an already extracted candidate set
pub(crate) fn purge_stylesheet(
    css: &RawCss,
    candidates: &FxHashSet<String>,
    options: &PurgeOptions,
) -> Result<PurgeResult> {
    let name = css.name.as_deref();
    let mut stylesheet = StyleSheet::parse(
        &css.raw,
        ParserOptions {
            filename: name.unwrap_or_default().to_string(),
            ..Default::default()
        },
    )
    .map_err(|e| PurgeError::parse(name, e.to_string()))?;

    let mut purger = SelectorPurger {
        candidates,
        options,
        rejected: Vec::new(),
    };
    purger.purge_rules(&mut stylesheet.rules, false);

    if options.variables {
        remove_unused_variables(&mut stylesheet.rules);
    }
    if options.keyframes {
        remove_unused_keyframes(&mut stylesheet.rules);
    }
    if options.font_face {
        remove_unused_font_faces(&mut stylesheet.rules);
    }

    let printed = stylesheet
        .to_css(PrinterOptions::default())
        .map_err(|e| PurgeError::print(name, e.to_string()))?;

    debug!(
        "[fob-purgecss] Purged {} ({} → {} bytes, {} selectors removed)",
        name.unwrap_or("<inline>"),
        css.raw.len(),
        printed.code.len(),
        purger.rejected.len()
    );

    Ok(PurgeResult {
        css: printed.code,
        name: css.name.clone(),
        rejected: options.rejected.then_some(purger.rejected),
    })
}

struct SelectorPurger<'a> {
    candidates: &'a FxHashSet<String>,
    options: &'a PurgeOptions,
    rejected: Vec<String>,
}

impl SelectorPurger<'_> {
    fn purge_rules(&mut self, rules: &mut CssRuleList<'_>, keep_all: bool) {
        rules.0.retain_mut(|rule| self.keep_rule(rule, keep_all));
    }

    fn keep_rule(&mut self, rule: &mut CssRule<'_>, keep_all: bool) -> bool {
        match rule {
            CssRule::Style(style) => {
                if keep_all {
                    return true;
                }

                let Ok(serialized) = style.selectors.to_css_string(PrinterOptions::default())
                else {
                    return true;
                };
                let selectors = split_selector_list(&serialized);
                // Only trust the split when it lines up with the parsed list
                if selectors.len() != style.selectors.0.len() {
                    self.purge_rules(&mut style.rules, false);
                    return true;
                }

                let mut keep_children = false;
                let mut verdicts = Vec::with_capacity(selectors.len());
                for selector in selectors {
                    let parts = selector_parts(&selector);
                    if self.is_whitelisted_children(&parts) {
                        keep_children = true;
                        verdicts.push(true);
                    } else if parts.iter().all(|part| self.is_used(part)) {
                        verdicts.push(true);
                    } else {
                        if self.options.rejected {
                            self.rejected.push(selector);
                        }
                        verdicts.push(false);
                    }
                }

                let mut verdicts = verdicts.into_iter();
                style.selectors.0.retain(|_| verdicts.next().unwrap_or(true));
                if style.selectors.0.is_empty() {
                    return false;
                }

                self.purge_rules(&mut style.rules, keep_children);
                true
            }
            CssRule::Media(media) => {
                self.purge_rules(&mut media.rules, keep_all);
                !media.rules.0.is_empty()
            }
            CssRule::Supports(supports) => {
                self.purge_rules(&mut supports.rules, keep_all);
                !supports.rules.0.is_empty()
            }
            CssRule::LayerBlock(layer) => {
                self.purge_rules(&mut layer.rules, keep_all);
                !layer.rules.0.is_empty()
            }
            CssRule::Container(container) => {
                self.purge_rules(&mut container.rules, keep_all);
                !container.rules.0.is_empty()
            }
            _ => true,
        }
    }

    fn is_used(&self, part: &SelectorPart) -> bool {
        match part {
            SelectorPart::Attribute {
                name,
                operator,
                value,
            } => {
                if ALWAYS_KEPT_ATTRIBUTES.contains(&name.as_str()) || self.is_whitelisted(name) {
                    return true;
                }
                match (operator, value) {
                    (Some(operator), Some(value)) => {
                        self.is_whitelisted(value)
                            || self
                                .candidates
                                .iter()
                                .any(|candidate| operator.matches(candidate, value))
                    }
                    _ => self.candidates.contains(name),
                }
            }
            SelectorPart::Tag(name) => {
                self.is_whitelisted(name)
                    || self.candidates.contains(name)
                    || self.candidates.contains(&name.to_ascii_lowercase())
            }
            other => {
                let name = other.name();
                self.is_whitelisted(name) || self.candidates.contains(name)
            }
        }
    }

    fn is_whitelisted(&self, name: &str) -> bool {
        self.options.whitelist.iter().any(|w| w == name)
            || self
                .options
                .whitelist_patterns
                .iter()
                .any(|pattern| pattern.is_match(name))
    }

    fn is_whitelisted_children(&self, parts: &[SelectorPart]) -> bool {
        self.options
            .whitelist_patterns_children
            .iter()
            .any(|pattern| parts.iter().any(|part| pattern.is_match(part.name())))
    }
}

/// Visit every declaration inside style rules and keyframes, at any depth
fn for_each_declaration<'i, F>(rules: &CssRuleList<'i>, f: &mut F)
where
    F: FnMut(&Property<'i>),
{
    for rule in &rules.0 {
        match rule {
            CssRule::Style(style) => {
                style.declarations.declarations.iter().for_each(&mut *f);
                style
                    .declarations
                    .important_declarations
                    .iter()
                    .for_each(&mut *f);
                for_each_declaration(&style.rules, f);
            }
            CssRule::Keyframes(keyframes) => {
                for keyframe in &keyframes.keyframes {
                    keyframe.declarations.declarations.iter().for_each(&mut *f);
                    keyframe
                        .declarations
                        .important_declarations
                        .iter()
                        .for_each(&mut *f);
                }
            }
            CssRule::Media(media) => for_each_declaration(&media.rules, f),
            CssRule::Supports(supports) => for_each_declaration(&supports.rules, f),
            CssRule::LayerBlock(layer) => for_each_declaration(&layer.rules, f),
            CssRule::Container(container) => for_each_declaration(&container.rules, f),
            _ => {}
        }
    }
}

/// Drop rules rejected by `keep`, descending into grouping rules
fn retain_rules<F>(rules: &mut CssRuleList<'_>, keep: &mut F)
where
    F: FnMut(&CssRule<'_>) -> bool,
{
    rules.0.retain_mut(|rule| {
        if !keep(&*rule) {
            return false;
        }
        match rule {
            CssRule::Style(style) => retain_rules(&mut style.rules, keep),
            CssRule::Media(media) => retain_rules(&mut media.rules, keep),
            CssRule::Supports(supports) => retain_rules(&mut supports.rules, keep),
            CssRule::LayerBlock(layer) => retain_rules(&mut layer.rules, keep),
            CssRule::Container(container) => retain_rules(&mut container.rules, keep),
            _ => {}
        }
        true
    });
}

fn declaration(property: &Property<'_>) -> (String, String) {
    let name = property.property_id().name().to_string();
    let value = property
        .value_to_css_string(PrinterOptions::default())
        .unwrap_or_default();
    (name, value)
}

/// Names referenced through `var(--name)` in a declaration value
fn var_references(value: &str) -> Vec<String> {
    value
        .match_indices("var(")
        .filter_map(|(start, _)| {
            let rest = value[start + 4..].trim_start();
            let end = rest
                .find(|c: char| !(c.is_alphanumeric() || c == '-' || c == '_' || c == '\\'))
                .unwrap_or(rest.len());
            let name = &rest[..end];
            name.starts_with("--").then(|| name.to_string())
        })
        .collect()
}

fn remove_unused_variables(rules: &mut CssRuleList<'_>) {
    let mut used = FxHashSet::default();
    let mut custom: Vec<(String, Vec<String>)> = Vec::new();

    for_each_declaration(rules, &mut |property| {
        let (name, value) = declaration(property);
        let references = var_references(&value);
        if name.starts_with("--") {
            custom.push((name, references));
        } else {
            used.extend(references);
        }
    });

    // Variables only read by other used variables are used too
    loop {
        let mut changed = false;
        for (name, references) in &custom {
            if used.contains(name) {
                for reference in references {
                    changed |= used.insert(reference.clone());
                }
            }
        }
        if !changed {
            break;
        }
    }

    retain_declarations(rules, &|property| {
        let name = property.property_id().name().to_string();
        !name.starts_with("--") || used.contains(&name)
    });
}

fn retain_declarations<F>(rules: &mut CssRuleList<'_>, keep: &F)
where
    F: Fn(&Property<'_>) -> bool,
{
    rules.0.retain_mut(|rule| match rule {
        CssRule::Style(style) => {
            let declarations = &mut style.declarations;
            let before = declarations.declarations.len() + declarations.important_declarations.len();
            declarations.declarations.retain(|p| keep(p));
            declarations.important_declarations.retain(|p| keep(p));
            let after = declarations.declarations.len() + declarations.important_declarations.len();

            retain_declarations(&mut style.rules, keep);
            // A rule emptied by this pass goes away; one that was empty already stays
            !(before > 0 && after == 0 && style.rules.0.is_empty())
        }
        CssRule::Media(media) => {
            retain_declarations(&mut media.rules, keep);
            !media.rules.0.is_empty()
        }
        CssRule::Supports(supports) => {
            retain_declarations(&mut supports.rules, keep);
            !supports.rules.0.is_empty()
        }
        CssRule::LayerBlock(layer) => {
            retain_declarations(&mut layer.rules, keep);
            !layer.rules.0.is_empty()
        }
        CssRule::Container(container) => {
            retain_declarations(&mut container.rules, keep);
            !container.rules.0.is_empty()
        }
        _ => true,
    });
}

fn identifiers(value: &str) -> impl Iterator<Item = &str> {
    value
        .split(|c: char| !(c.is_alphanumeric() || c == '-' || c == '_'))
        .filter(|word| !word.is_empty())
}

fn keyframes_name(name: &KeyframesName<'_>) -> String {
    match name {
        KeyframesName::Ident(ident) => ident.0.to_string(),
        KeyframesName::Custom(custom) => custom.to_string(),
    }
}

fn remove_unused_keyframes(rules: &mut CssRuleList<'_>) {
    let mut animations = FxHashSet::default();
    for_each_declaration(rules, &mut |property| {
        let (name, value) = declaration(property);
        if name.ends_with("animation") || name.ends_with("animation-name") {
            animations.extend(identifiers(&value).map(str::to_string));
        }
    });

    retain_rules(rules, &mut |rule| match rule {
        CssRule::Keyframes(keyframes) => animations.contains(&keyframes_name(&keyframes.name)),
        _ => true,
    });
}

fn unquote(value: &str) -> String {
    value
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
        .to_lowercase()
}

/// Family declared by a serialized `@font-face` rule
fn font_face_family(serialized: &str) -> Option<String> {
    let start = serialized.find("font-family:")? + "font-family:".len();
    let rest = &serialized[start..];
    let end = rest.find([';', '}']).unwrap_or(rest.len());
    Some(unquote(&rest[..end]))
}

fn remove_unused_font_faces(rules: &mut CssRuleList<'_>) {
    let mut families = FxHashSet::default();
    for_each_declaration(rules, &mut |property| {
        let (name, value) = declaration(property);
        let shorthand = name == "font";
        if !shorthand && name != "font-family" {
            return;
        }
        for family in value.split(',') {
            families.insert(unquote(family));
            if shorthand {
                // `font: italic 12px Open Sans` puts the family after the size
                let words: Vec<&str> = family.split_whitespace().collect();
                for i in 0..words.len() {
                    families.insert(unquote(&words[i..].join(" ")));
                }
            }
        }
    });

    retain_rules(rules, &mut |rule| match rule {
        CssRule::FontFace(_) => rule
            .to_css_string(PrinterOptions::default())
            .ok()
            .and_then(|serialized| font_face_family(&serialized))
            .is_none_or(|family| families.contains(&family)),
        _ => true,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_var_references() {
        assert_eq!(var_references("var(--a)"), vec!["--a"]);
        assert_eq!(
            var_references("calc(var(--a) + var( --b, 1px))"),
            vec!["--a", "--b"]
        );
        assert!(var_references("red").is_empty());
    }

    #[test]
    fn test_font_face_family() {
        assert_eq!(
            font_face_family("@font-face {\n  font-family: \"Open Sans\";\n  src: url(a.woff)\n}"),
            Some("open sans".to_string())
        );
        assert_eq!(font_face_family("@font-face{src:url(a.woff)}"), None);
    }

    #[test]
    fn test_identifiers() {
        let words: Vec<&str> = identifiers("spin 1s linear infinite").collect();
        assert_eq!(words, vec!["spin", "1s", "linear", "infinite"]);
    }
}
