//! A small mustache-style template engine.
//!
//! Supports `{{name}}` and dotted `{{a.b}}` lookups, `{{#section}}` blocks
//! (repeated for arrays, rendered once for other truthy values),
//! `{{^section}}` inverted blocks and `{{! comments }}`. Output is never
//! escaped, so `{{{name}}}` and `{{&name}}` are the same as `{{name}}`. Block and comment tags alone on a line remove that line.
//!
//! Names resolve against the innermost block value first, then outwards to
//! the root context. An unknown `{{name}}` is an error; an unknown section
//! is treated as empty.

use serde_json::Value;

use crate::error::{IconError, Result};

use super::TemplateEngine;

/// Identifier of the built-in engine.
pub const MUSTACHE: &str = "mustache";

#[derive(Debug, Default, Clone, Copy)]
pub struct MustacheEngine;

impl TemplateEngine for MustacheEngine {
    fn name(&self) -> &str {
        MUSTACHE
    }

    fn render(&self, template: &str, context: &Value) -> Result<String> {
        let nodes = parse(template)?;
        let mut out = String::with_capacity(template.len());
        let mut scopes = vec![context];
        render_nodes(&nodes, &mut scopes, &mut out)?;
        Ok(out)
    }
}

#[derive(Debug, PartialEq)]
enum Node {
    Text(String),
    Var(String),
    Section {
        name: String,
        inverted: bool,
        children: Vec<Node>,
    },
}

fn parse(src: &str) -> Result<Vec<Node>> {
    let mut open: Vec<(String, bool, Vec<Node>)> = Vec::new();
    let mut nodes: Vec<Node> = Vec::new();
    let mut pos = 0;

    while let Some(offset) = src[pos..].find("{{") {
        let start = pos + offset;
        let inner = start + 2;

        if src[inner..].starts_with('{') {
            let body = inner + 1;
            let close = src[body..].find("}}}").ok_or_else(|| {
                render_error(format!("Unclosed {{{{{{ tag on line {}", line_of(src, start)))
            })?;
            let name = src[body..body + close].trim();
            if name.is_empty() {
                return Err(render_error(format!("Empty tag on line {}", line_of(src, start))));
            }
            if start > pos {
                nodes.push(Node::Text(src[pos..start].to_string()));
            }
            nodes.push(Node::Var(name.to_string()));
            pos = body + close + 3;
            continue;
        }

        let close = src[inner..]
            .find("}}")
            .ok_or_else(|| render_error(format!("Unclosed tag on line {}", line_of(src, start))))?;
        let tag = src[inner..inner + close].trim();
        let mut end = inner + close + 2;
        let mut text_end = start;

        let sigil = tag.chars().next();
        if matches!(sigil, Some('#' | '^' | '/' | '!')) {
            if let Some((line_start, line_end)) = standalone(src, start, end) {
                text_end = line_start.max(pos);
                end = line_end;
            }
        }

        if text_end > pos {
            nodes.push(Node::Text(src[pos..text_end].to_string()));
        }

        match sigil {
            Some('!') => {}
            Some(c @ ('#' | '^')) => {
                let name = tag_name(tag, src, start)?;
                open.push((name, c == '^', std::mem::take(&mut nodes)));
            }
            Some('/') => {
                let name = tag_name(tag, src, start)?;
                let (expected, inverted, parent) = open.pop().ok_or_else(|| {
                    render_error(format!(
                        "Unexpected {{{{/{}}}}} on line {}",
                        name,
                        line_of(src, start)
                    ))
                })?;
                if expected != name {
                    return Err(render_error(format!(
                        "Section \"{}\" closed by \"{}\" on line {}",
                        expected,
                        name,
                        line_of(src, start)
                    )));
                }
                let children = std::mem::replace(&mut nodes, parent);
                nodes.push(Node::Section {
                    name,
                    inverted,
                    children,
                });
            }
            Some('&') => nodes.push(Node::Var(tag_name(tag, src, start)?)),
            Some(_) => nodes.push(Node::Var(tag.to_string())),
            None => {
                return Err(render_error(format!(
                    "Empty tag on line {}",
                    line_of(src, start)
                )))
            }
        }

        pos = end;
    }

    if pos < src.len() {
        nodes.push(Node::Text(src[pos..].to_string()));
    }

    if let Some((name, _, _)) = open.pop() {
        return Err(render_error(format!("Unclosed section \"{}\"", name)));
    }

    Ok(nodes)
}

/// If the tag spanning `start..end` is the only thing on its line, return
/// the byte range of that whole line (including its newline).
fn standalone(src: &str, start: usize, end: usize) -> Option<(usize, usize)> {
    let line_start = src[..start].rfind('\n').map_or(0, |i| i + 1);
    if !src[line_start..start].chars().all(|c| c == ' ' || c == '\t') {
        return None;
    }

    let rest = &src[end..];
    let (trailing, line_end) = match rest.find('\n') {
        Some(i) => (&rest[..i], end + i + 1),
        None => (rest, src.len()),
    };
    if !trailing.chars().all(|c| c == ' ' || c == '\t' || c == '\r') {
        return None;
    }

    Some((line_start, line_end))
}

fn tag_name(tag: &str, src: &str, start: usize) -> Result<String> {
    let name = tag[1..].trim();
    if name.is_empty() {
        return Err(render_error(format!(
            "Missing name after \"{}\" on line {}",
            &tag[..1],
            line_of(src, start)
        )));
    }
    Ok(name.to_string())
}

fn render_nodes<'a>(nodes: &[Node], scopes: &mut Vec<&'a Value>, out: &mut String) -> Result<()> {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Var(name) => match lookup(scopes, name) {
                Some(Value::String(s)) => out.push_str(s),
                Some(Value::Number(n)) => out.push_str(&n.to_string()),
                Some(Value::Bool(b)) => out.push_str(if *b { "true" } else { "false" }),
                Some(Value::Null) => {}
                Some(_) => {
                    return Err(render_error(format!(
                        "\"{}\" is a list or object and cannot be printed",
                        name
                    )))
                }
                None => return Err(render_error(format!("Unknown variable \"{}\"", name))),
            },
            Node::Section {
                name,
                inverted,
                children,
            } => {
                let value = lookup(scopes, name);
                if *inverted {
                    if !value.is_some_and(is_truthy) {
                        render_nodes(children, scopes, out)?;
                    }
                    continue;
                }
                match value {
                    Some(Value::Array(items)) => {
                        for item in items {
                            scopes.push(item);
                            render_nodes(children, scopes, out)?;
                            scopes.pop();
                        }
                    }
                    Some(value) if is_truthy(value) => {
                        scopes.push(value);
                        render_nodes(children, scopes, out)?;
                        scopes.pop();
                    }
                    _ => {}
                }
            }
        }
    }
    Ok(())
}

fn lookup<'a>(scopes: &[&'a Value], name: &str) -> Option<&'a Value> {
    if name == "." {
        return scopes.last().copied();
    }

    let mut parts = name.split('.');
    let first = parts.next()?;
    let mut value = scopes.iter().rev().find_map(|scope| (*scope).get(first))?;
    for part in parts {
        value = value.get(part)?;
    }
    Some(value)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Number(_) | Value::Object(_) => true,
    }
}

fn line_of(src: &str, offset: usize) -> usize {
    src[..offset].matches('\n').count() + 1
}

fn render_error(message: String) -> IconError {
    IconError::Render {
        message,
        help: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn render(template: &str, context: Value) -> Result<String> {
        MustacheEngine.render(template, &context)
    }

    #[test]
    fn test_variables() {
        let out = render("Hello {{ name }}!", json!({"name": "Icons"})).unwrap();
        assert_eq!(out, "Hello Icons!");
    }

    #[test]
    fn test_dotted_lookup() {
        let out = render("{{font.name}}", json!({"font": {"name": "Icons"}})).unwrap();
        assert_eq!(out, "Icons");
    }

    #[test]
    fn test_section_iterates_with_outer_scope() {
        let out = render(
            "{{#glyphs}}.{{cssClass}}-{{fileName}}={{codePoint}};{{/glyphs}}",
            json!({
                "cssClass": "icon",
                "glyphs": [
                    {"fileName": "home", "codePoint": "E001"},
                    {"fileName": "user", "codePoint": "E002"}
                ]
            }),
        )
        .unwrap();
        assert_eq!(out, ".icon-home=E001;.icon-user=E002;");
    }

    #[test]
    fn test_inverted_and_missing_sections() {
        let template = "{{#alias}}{{alias}}{{/alias}}{{^alias}}{{name}}{{/alias}}";

        let out = render(template, json!({"name": "home"})).unwrap();
        assert_eq!(out, "home");

        let out = render(template, json!({"name": "house", "alias": "home"})).unwrap();
        assert_eq!(out, "home");
    }

    #[test]
    fn test_standalone_tags_remove_their_line() {
        let template = "start\n{{! note }}\n{{#items}}\n- {{.}}\n{{/items}}\nend\n";
        let out = render(template, json!({"items": ["a", "b"]})).unwrap();
        assert_eq!(out, "start\n- a\n- b\nend\n");
    }

    #[test]
    fn test_backslash_before_tag() {
        let out = render("content: \"\\{{cp}}\";", json!({"cp": "E001"})).unwrap();
        assert_eq!(out, "content: \"\\E001\";");
    }

    #[test]
    fn test_single_braces_pass_through() {
        let out = render("&:#{$insert} {", json!({})).unwrap();
        assert_eq!(out, "&:#{$insert} {");
    }

    #[test]
    fn test_unknown_variable_is_error() {
        let err = render("{{missing}}", json!({})).unwrap_err();
        assert!(matches!(err, IconError::Render { .. }));
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_malformed_templates_are_errors() {
        assert!(render("{{name", json!({"name": "x"})).is_err());
        assert!(render("{{#a}}x", json!({})).is_err());
        assert!(render("{{#a}}x{{/b}}", json!({})).is_err());
        assert!(render("x{{/a}}", json!({})).is_err());
        assert!(render("{{}}", json!({})).is_err());
    }

    #[test]
    fn test_object_variable_is_error() {
        assert!(render("{{glyphs}}", json!({"glyphs": []})).is_err());
    }

    #[test]
    fn test_unescaped_forms_match_plain_variables() {
        let context = json!({"fontName": "Icons & Co", "glyph": {"codePoint": "E001"}});
        let out = render("{{{fontName}}}|{{& fontName}}|{{{ glyph.codePoint }}}", context).unwrap();
        assert_eq!(out, "Icons & Co|Icons & Co|E001");
    }

    #[test]
    fn test_unclosed_triple_tag_is_error() {
        let err = render("{{{name}}", json!({"name": "x"})).unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }
}
