//! Pratt expression parser.
//!
//! Handles literals, names, array and object literals, function and arrow
//! expressions, member/index access, calls, `new`, prefix and postfix
//! operators, binary operators with the usual precedence, the conditional
//! operator, (compound) assignment and template literals.

use crate::syntax_kind::SyntaxKind;

use super::patterns::parse_param_list;
use super::statements::parse_block;
use super::{MarkClosed, Parser};

// ── Binding Power Tables ───────────────────────────────────────────────

/// Returns (left_bp, right_bp) for binary operators.
///
/// Left < right means left-associative; `**` is the only right-associative
/// binary operator.
fn infix_binding_power(op: SyntaxKind, no_in: bool) -> Option<(u8, u8)> {
    match op {
        SyntaxKind::QUESTION_QUESTION => Some((4, 5)),
        SyntaxKind::PIPE_PIPE => Some((6, 7)),
        SyntaxKind::AMP_AMP => Some((8, 9)),
        SyntaxKind::PIPE => Some((10, 11)),
        SyntaxKind::CARET => Some((12, 13)),
        SyntaxKind::AMP => Some((14, 15)),

        SyntaxKind::EQ_EQ | SyntaxKind::NOT_EQ | SyntaxKind::EQ_EQ_EQ | SyntaxKind::NOT_EQ_EQ => {
            Some((16, 17))
        }

        SyntaxKind::LT
        | SyntaxKind::GT
        | SyntaxKind::LT_EQ
        | SyntaxKind::GT_EQ
        | SyntaxKind::INSTANCEOF_KW => Some((18, 19)),
        SyntaxKind::IN_KW if !no_in => Some((18, 19)),

        SyntaxKind::SHL | SyntaxKind::SHR | SyntaxKind::USHR => Some((20, 21)),
        SyntaxKind::PLUS | SyntaxKind::MINUS => Some((22, 23)),
        SyntaxKind::STAR | SyntaxKind::SLASH | SyntaxKind::PERCENT => Some((24, 25)),
        SyntaxKind::STAR_STAR => Some((27, 26)),

        _ => None,
    }
}

fn is_prefix_op(op: SyntaxKind) -> bool {
    matches!(
        op,
        SyntaxKind::BANG
            | SyntaxKind::MINUS
            | SyntaxKind::PLUS
            | SyntaxKind::TILDE
            | SyntaxKind::TYPEOF_KW
            | SyntaxKind::VOID_KW
            | SyntaxKind::DELETE_KW
    )
}

const ASSIGN_BP: (u8, u8) = (2, 1);
const CONDITIONAL_BP: u8 = 3;
const PREFIX_BP: u8 = 28;
const POSTFIX_UPDATE_BP: u8 = 29;
/// Member access, indexing and calls bind tighter than everything else.
const POSTFIX_BP: u8 = 30;

// ── Expression Entry Point ─────────────────────────────────────────────

/// Parse an assignment-level expression.
pub(crate) fn expr(p: &mut Parser) -> Option<MarkClosed> {
    expr_bp(p, 0)
}

fn expr_bp(p: &mut Parser, min_bp: u8) -> Option<MarkClosed> {
    let mut lhs = lhs(p)?;

    loop {
        if p.has_error() {
            break;
        }

        let current = p.current();

        if let Some(closed) = postfix(p, lhs, min_bp) {
            lhs = closed;
            continue;
        }

        if matches!(current, SyntaxKind::PLUS_PLUS | SyntaxKind::MINUS_MINUS)
            && POSTFIX_UPDATE_BP >= min_bp
            && !p.at_line_break()
        {
            let m = p.open_before(lhs);
            p.advance();
            lhs = p.close(m, SyntaxKind::UPDATE_EXPR);
            continue;
        }

        if let Some((l_bp, r_bp)) = infix_binding_power(current, p.no_in()) {
            if l_bp < min_bp {
                break;
            }
            let m = p.open_before(lhs);
            p.advance(); // operator
            expr_bp(p, r_bp);
            lhs = p.close(m, SyntaxKind::BINARY_EXPR);
            continue;
        }

        if current == SyntaxKind::QUESTION && CONDITIONAL_BP >= min_bp {
            let m = p.open_before(lhs);
            p.advance(); // ?
            p.with_no_in(false, |p| expr_bp(p, 0));
            p.expect(SyntaxKind::COLON);
            expr_bp(p, ASSIGN_BP.1);
            lhs = p.close(m, SyntaxKind::COND_EXPR);
            continue;
        }

        if current.is_assign_op() && ASSIGN_BP.0 >= min_bp {
            let m = p.open_before(lhs);
            p.advance(); // operator
            expr_bp(p, ASSIGN_BP.1);
            lhs = p.close(m, SyntaxKind::ASSIGN_EXPR);
            continue;
        }

        break;
    }

    Some(lhs)
}

/// Member access, indexing and calls on `lhs`, or `None` if the current
/// token starts none of them.
fn postfix(p: &mut Parser, lhs: MarkClosed, min_bp: u8) -> Option<MarkClosed> {
    if POSTFIX_BP < min_bp {
        return None;
    }
    match p.current() {
        SyntaxKind::L_PAREN => {
            let m = p.open_before(lhs);
            parse_arg_list(p);
            Some(p.close(m, SyntaxKind::CALL_EXPR))
        }
        SyntaxKind::DOT | SyntaxKind::L_BRACKET => Some(member_or_index(p, lhs)),
        _ => None,
    }
}

fn member_or_index(p: &mut Parser, lhs: MarkClosed) -> MarkClosed {
    let m = p.open_before(lhs);
    if p.eat(SyntaxKind::DOT) {
        if p.at(SyntaxKind::IDENT) || p.current().is_keyword() {
            p.advance();
        } else {
            p.error("expected property name after `.`");
        }
        p.close(m, SyntaxKind::MEMBER_EXPR)
    } else {
        p.advance(); // [
        p.with_no_in(false, expr);
        p.expect(SyntaxKind::R_BRACKET);
        p.close(m, SyntaxKind::INDEX_EXPR)
    }
}

// ── Atom / Prefix Parsing (LHS) ───────────────────────────────────────

fn lhs(p: &mut Parser) -> Option<MarkClosed> {
    let current = p.current();

    if is_prefix_op(current) {
        let m = p.open();
        p.advance();
        expr_bp(p, PREFIX_BP);
        return Some(p.close(m, SyntaxKind::UNARY_EXPR));
    }

    match current {
        SyntaxKind::AWAIT_KW => {
            let m = p.open();
            p.advance();
            expr_bp(p, PREFIX_BP);
            Some(p.close(m, SyntaxKind::AWAIT_EXPR))
        }
        SyntaxKind::PLUS_PLUS | SyntaxKind::MINUS_MINUS => {
            let m = p.open();
            p.advance();
            expr_bp(p, PREFIX_BP);
            Some(p.close(m, SyntaxKind::UPDATE_EXPR))
        }
        SyntaxKind::NEW_KW => Some(parse_new(p)),
        _ => atom(p),
    }
}

fn atom(p: &mut Parser) -> Option<MarkClosed> {
    match p.current() {
        SyntaxKind::NUMBER
        | SyntaxKind::STRING
        | SyntaxKind::REGEX
        | SyntaxKind::TRUE_KW
        | SyntaxKind::FALSE_KW
        | SyntaxKind::NULL_KW => {
            let m = p.open();
            p.advance();
            Some(p.close(m, SyntaxKind::LITERAL))
        }

        SyntaxKind::TEMPLATE_START => Some(parse_template(p)),

        SyntaxKind::THIS_KW => {
            let m = p.open();
            p.advance();
            Some(p.close(m, SyntaxKind::THIS_EXPR))
        }

        SyntaxKind::IDENT if p.current_text() == "async" && p.nth(1) == SyntaxKind::FUNCTION_KW => {
            Some(parse_fn_expr(p))
        }

        // Single-parameter arrow: `x => body`
        SyntaxKind::IDENT if p.nth(1) == SyntaxKind::FAT_ARROW => {
            let m = p.open();
            let params = p.open();
            let name = p.open();
            p.advance(); // parameter
            p.close(name, SyntaxKind::NAME);
            p.close(params, SyntaxKind::PARAM_LIST);
            p.advance(); // =>
            parse_arrow_body(p);
            Some(p.close(m, SyntaxKind::ARROW_FN))
        }

        SyntaxKind::IDENT => {
            let m = p.open();
            p.advance();
            Some(p.close(m, SyntaxKind::NAME_REF))
        }

        SyntaxKind::L_PAREN if p.paren_starts_arrow() => {
            let m = p.open();
            parse_param_list(p);
            p.expect(SyntaxKind::FAT_ARROW);
            parse_arrow_body(p);
            Some(p.close(m, SyntaxKind::ARROW_FN))
        }

        SyntaxKind::L_PAREN => {
            let m = p.open();
            p.advance(); // (
            p.with_no_in(false, expr);
            p.expect(SyntaxKind::R_PAREN);
            Some(p.close(m, SyntaxKind::PAREN_EXPR))
        }

        SyntaxKind::L_BRACKET => Some(parse_array(p)),
        SyntaxKind::L_BRACE => Some(parse_object(p)),
        SyntaxKind::FUNCTION_KW => Some(parse_fn_expr(p)),

        _ => {
            p.error("expected expression");
            None
        }
    }
}

// ── Calls and `new` ────────────────────────────────────────────────────

/// `(expr, ...spread, ...)`
fn parse_arg_list(p: &mut Parser) {
    let m = p.open();
    p.advance(); // (

    p.with_no_in(false, |p| {
        while !p.at(SyntaxKind::R_PAREN) && !p.at(SyntaxKind::EOF) && !p.has_error() {
            parse_element(p);
            if !p.eat(SyntaxKind::COMMA) {
                break;
            }
        }
    });

    p.expect(SyntaxKind::R_PAREN);
    p.close(m, SyntaxKind::ARG_LIST);
}

/// `new Callee(args)`. The callee is a member chain without calls; the
/// argument list is optional.
fn parse_new(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    p.advance(); // new

    let callee = if p.at(SyntaxKind::NEW_KW) {
        Some(parse_new(p))
    } else {
        atom(p)
    };
    if let Some(mut callee) = callee {
        while matches!(p.current(), SyntaxKind::DOT | SyntaxKind::L_BRACKET) && !p.has_error() {
            callee = member_or_index(p, callee);
        }
    }

    if p.at(SyntaxKind::L_PAREN) {
        parse_arg_list(p);
    }
    p.close(m, SyntaxKind::NEW_EXPR)
}

// ── Literals ───────────────────────────────────────────────────────────

/// An expression or `...spread` inside an array literal or argument list.
fn parse_element(p: &mut Parser) {
    if p.at(SyntaxKind::DOT_DOT_DOT) {
        let m = p.open();
        p.advance();
        expr(p);
        p.close(m, SyntaxKind::SPREAD_ELEMENT);
    } else {
        expr(p);
    }
}

/// `[a, , ...b]`; holes are bare commas.
fn parse_array(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    p.advance(); // [

    p.with_no_in(false, |p| {
        while !p.at(SyntaxKind::R_BRACKET) && !p.at(SyntaxKind::EOF) && !p.has_error() {
            if p.eat(SyntaxKind::COMMA) {
                continue;
            }
            parse_element(p);
            if !p.eat(SyntaxKind::COMMA) {
                break;
            }
        }
    });

    p.expect(SyntaxKind::R_BRACKET);
    p.close(m, SyntaxKind::ARRAY_EXPR)
}

/// Object literal with plain, shorthand, computed, method, accessor and
/// spread members.
fn parse_object(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    let open_span = p.current_span();
    p.advance(); // {

    p.with_no_in(false, |p| {
        while !p.at(SyntaxKind::R_BRACE) && !p.at(SyntaxKind::EOF) && !p.has_error() {
            parse_object_member(p);
            if !p.eat(SyntaxKind::COMMA) {
                break;
            }
        }
    });

    if p.at(SyntaxKind::EOF) {
        p.error_with_related("expected `}`", open_span, "object literal opened here");
    } else {
        p.expect(SyntaxKind::R_BRACE);
    }
    p.close(m, SyntaxKind::OBJECT_EXPR)
}

fn parse_object_member(p: &mut Parser) {
    if p.at(SyntaxKind::DOT_DOT_DOT) {
        let m = p.open();
        p.advance();
        expr(p);
        p.close(m, SyntaxKind::SPREAD_ELEMENT);
        return;
    }

    let m = p.open();

    // `get name() {}` / `set name(v) {}`
    if (p.at_contextual("get") || p.at_contextual("set")) && is_property_key_start(p.nth(1)) {
        p.advance(); // get / set
        parse_property_key(p);
        parse_param_list(p);
        parse_block(p);
        p.close(m, SyntaxKind::OBJECT_METHOD);
        return;
    }

    let shorthand_candidate = p.at(SyntaxKind::IDENT);
    parse_property_key(p);

    if p.at(SyntaxKind::L_PAREN) {
        parse_param_list(p);
        parse_block(p);
        p.close(m, SyntaxKind::OBJECT_METHOD);
    } else if p.eat(SyntaxKind::COLON) {
        expr(p);
        p.close(m, SyntaxKind::PROPERTY);
    } else {
        if !shorthand_candidate {
            p.error("expected `:` after property name");
        }
        p.close(m, SyntaxKind::PROPERTY);
    }
}

fn is_property_key_start(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::IDENT | SyntaxKind::STRING | SyntaxKind::NUMBER | SyntaxKind::L_BRACKET
    ) || kind.is_keyword()
}

/// A property name token, or `[expr]` wrapped in COMPUTED_KEY.
pub(crate) fn parse_property_key(p: &mut Parser) {
    let current = p.current();
    if current == SyntaxKind::L_BRACKET {
        let m = p.open();
        p.advance(); // [
        p.with_no_in(false, expr);
        p.expect(SyntaxKind::R_BRACKET);
        p.close(m, SyntaxKind::COMPUTED_KEY);
    } else if is_property_key_start(current) {
        p.advance();
    } else {
        p.error("expected property name");
    }
}

/// A template literal. The lexer splits it into
///   TEMPLATE_START  TEMPLATE_CONTENT?  (INTERPOLATION_START expr INTERPOLATION_END TEMPLATE_CONTENT?)*  TEMPLATE_END
/// and every `${ }` becomes an INTERPOLATION node holding its expression.
fn parse_template(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    let open_span = p.current_span();
    p.advance(); // `

    loop {
        match p.current() {
            SyntaxKind::TEMPLATE_CONTENT => p.advance(),
            SyntaxKind::INTERPOLATION_START => {
                let interp = p.open();
                p.advance(); // ${
                p.with_no_in(false, expr);
                p.expect(SyntaxKind::INTERPOLATION_END);
                p.close(interp, SyntaxKind::INTERPOLATION);
                if p.has_error() {
                    break;
                }
            }
            SyntaxKind::TEMPLATE_END => {
                p.advance();
                break;
            }
            _ => {
                p.error_with_related("unterminated template literal", open_span, "template starts here");
                break;
            }
        }
    }

    p.close(m, SyntaxKind::TEMPLATE_EXPR)
}

// ── Functions ──────────────────────────────────────────────────────────

/// `[async] function [name](params) { body }`
fn parse_fn_expr(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    if p.at_contextual("async") {
        p.advance();
    }
    p.advance(); // function
    if p.at(SyntaxKind::IDENT) {
        let name = p.open();
        p.advance();
        p.close(name, SyntaxKind::NAME);
    }
    parse_param_list(p);
    parse_block(p);
    p.close(m, SyntaxKind::FN_EXPR)
}

/// A block body, or a single expression body.
fn parse_arrow_body(p: &mut Parser) {
    if p.at(SyntaxKind::L_BRACE) {
        parse_block(p);
    } else {
        p.with_no_in(false, expr);
    }
}
