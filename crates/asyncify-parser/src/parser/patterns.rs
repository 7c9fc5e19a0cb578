//! Binding patterns: names, object and array destructuring, defaults and
//! rest elements, as used in declarations, parameters and catch clauses.

use crate::syntax_kind::SyntaxKind;

use super::expressions::{expr, parse_property_key};
use super::{MarkClosed, Parser};

/// Parse a binding target.
///
/// - `ident` -> NAME
/// - `{ a, b: c, ...rest }` -> OBJECT_PAT
/// - `[a, , b = 1, ...rest]` -> ARRAY_PAT
pub(crate) fn parse_binding(p: &mut Parser) -> Option<MarkClosed> {
    match p.current() {
        SyntaxKind::IDENT => Some(parse_name(p)),
        SyntaxKind::L_BRACE => Some(parse_object_pattern(p)),
        SyntaxKind::L_BRACKET => Some(parse_array_pattern(p)),
        _ => {
            p.error("expected binding name or pattern");
            None
        }
    }
}

/// A binding with an optional `= default`, wrapped in ASSIGN_PAT.
pub(crate) fn parse_binding_element(p: &mut Parser) {
    let Some(target) = parse_binding(p) else {
        return;
    };
    if p.at(SyntaxKind::EQ) {
        let m = p.open_before(target);
        p.advance(); // =
        expr(p);
        p.close(m, SyntaxKind::ASSIGN_PAT);
    }
}

pub(crate) fn parse_name(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    p.advance();
    p.close(m, SyntaxKind::NAME)
}

fn parse_rest(p: &mut Parser) {
    let m = p.open();
    p.advance(); // ...
    parse_binding(p);
    p.close(m, SyntaxKind::REST_PAT);
}

fn parse_object_pattern(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    p.advance(); // {

    while !p.at(SyntaxKind::R_BRACE) && !p.at(SyntaxKind::EOF) && !p.has_error() {
        if p.at(SyntaxKind::DOT_DOT_DOT) {
            parse_rest(p);
        } else {
            let prop = p.open();
            if p.at(SyntaxKind::IDENT) && p.nth(1) != SyntaxKind::COLON {
                // Shorthand: `{ a }` or `{ a = 1 }`
                parse_binding_element(p);
            } else {
                parse_property_key(p);
                p.expect(SyntaxKind::COLON);
                parse_binding_element(p);
            }
            p.close(prop, SyntaxKind::PAT_PROP);
        }
        if !p.eat(SyntaxKind::COMMA) {
            break;
        }
    }

    p.expect(SyntaxKind::R_BRACE);
    p.close(m, SyntaxKind::OBJECT_PAT)
}

fn parse_array_pattern(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    p.advance(); // [

    while !p.at(SyntaxKind::R_BRACKET) && !p.at(SyntaxKind::EOF) && !p.has_error() {
        if p.eat(SyntaxKind::COMMA) {
            continue;
        }
        if p.at(SyntaxKind::DOT_DOT_DOT) {
            parse_rest(p);
        } else {
            parse_binding_element(p);
        }
        if !p.eat(SyntaxKind::COMMA) {
            break;
        }
    }

    p.expect(SyntaxKind::R_BRACKET);
    p.close(m, SyntaxKind::ARRAY_PAT)
}

/// `(a, { b }, c = 1, ...rest)`
pub(crate) fn parse_param_list(p: &mut Parser) {
    let m = p.open();
    p.expect(SyntaxKind::L_PAREN);

    while !p.at(SyntaxKind::R_PAREN) && !p.at(SyntaxKind::EOF) && !p.has_error() {
        if p.at(SyntaxKind::DOT_DOT_DOT) {
            parse_rest(p);
        } else {
            parse_binding_element(p);
        }
        if !p.eat(SyntaxKind::COMMA) {
            break;
        }
    }

    p.expect(SyntaxKind::R_PAREN);
    p.close(m, SyntaxKind::PARAM_LIST);
}
