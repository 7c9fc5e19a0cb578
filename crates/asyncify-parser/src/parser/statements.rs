//! Statement and declaration parsing, plus the source file entry point.

use crate::syntax_kind::SyntaxKind;

use super::expressions::expr;
use super::patterns::{parse_binding, parse_name, parse_param_list};
use super::Parser;

/// Parse a whole script into a SOURCE_FILE node.
///
/// After the first error the remaining tokens are collected into an
/// ERROR_NODE so the tree still covers the full input.
pub(crate) fn parse_source_file(p: &mut Parser) {
    let root = p.open();

    while !p.at(SyntaxKind::EOF) {
        parse_stmt(p);
        if p.has_error() {
            if !p.at(SyntaxKind::EOF) {
                let rest = p.open();
                while !p.at(SyntaxKind::EOF) {
                    p.advance();
                }
                p.close(rest, SyntaxKind::ERROR_NODE);
            }
            break;
        }
    }

    p.advance(); // EOF
    p.close(root, SyntaxKind::SOURCE_FILE);
}

fn at_async_function(p: &Parser) -> bool {
    p.at_contextual("async") && p.nth(1) == SyntaxKind::FUNCTION_KW
}

pub(crate) fn parse_stmt(p: &mut Parser) {
    match p.current() {
        SyntaxKind::L_BRACE => parse_block(p),
        SyntaxKind::VAR_KW | SyntaxKind::LET_KW | SyntaxKind::CONST_KW => {
            parse_var_decl(p, false)
        }
        SyntaxKind::FUNCTION_KW => parse_fn_decl(p),
        SyntaxKind::IDENT if at_async_function(p) => parse_fn_decl(p),
        SyntaxKind::RETURN_KW => parse_return(p),
        SyntaxKind::IF_KW => parse_if(p),
        SyntaxKind::WHILE_KW => parse_while(p),
        SyntaxKind::DO_KW => parse_do_while(p),
        SyntaxKind::FOR_KW => parse_for(p),
        SyntaxKind::SWITCH_KW => parse_switch(p),
        SyntaxKind::TRY_KW => parse_try(p),
        SyntaxKind::THROW_KW => {
            let m = p.open();
            p.advance();
            if p.at_line_break() {
                p.error("line break not allowed after `throw`");
            }
            expr(p);
            p.consume_semicolon();
            p.close(m, SyntaxKind::THROW_STMT);
        }
        SyntaxKind::BREAK_KW | SyntaxKind::CONTINUE_KW => {
            let kind = if p.at(SyntaxKind::BREAK_KW) {
                SyntaxKind::BREAK_STMT
            } else {
                SyntaxKind::CONTINUE_STMT
            };
            let m = p.open();
            p.advance();
            if p.at(SyntaxKind::IDENT) && !p.at_line_break() {
                p.error("labels are not supported");
            }
            p.consume_semicolon();
            p.close(m, kind);
        }
        SyntaxKind::SEMICOLON => {
            let m = p.open();
            p.advance();
            p.close(m, SyntaxKind::EMPTY_STMT);
        }
        _ => {
            let m = p.open();
            expr(p);
            p.consume_semicolon();
            p.close(m, SyntaxKind::EXPR_STMT);
        }
    }
}

/// `{ stmt* }`
pub(crate) fn parse_block(p: &mut Parser) {
    let m = p.open();
    let open_span = p.current_span();
    if !p.expect(SyntaxKind::L_BRACE) {
        p.close(m, SyntaxKind::BLOCK_STMT);
        return;
    }

    while !p.at(SyntaxKind::R_BRACE) && !p.at(SyntaxKind::EOF) && !p.has_error() {
        parse_stmt(p);
    }

    if p.at(SyntaxKind::EOF) {
        p.error_with_related("expected `}`", open_span, "block opened here");
    } else {
        p.expect(SyntaxKind::R_BRACE);
    }
    p.close(m, SyntaxKind::BLOCK_STMT);
}

/// `var|let|const declarator, ...`. Inside a `for` head no semicolon is
/// consumed and declarators may omit their initializer.
pub(crate) fn parse_var_decl(p: &mut Parser, in_for_head: bool) {
    let m = p.open();
    p.advance(); // var / let / const

    loop {
        let decl = p.open();
        parse_binding(p);
        if p.eat(SyntaxKind::EQ) {
            expr(p);
        }
        p.close(decl, SyntaxKind::VAR_DECLARATOR);
        if p.has_error() || !p.eat(SyntaxKind::COMMA) {
            break;
        }
    }

    if !in_for_head {
        p.consume_semicolon();
    }
    p.close(m, SyntaxKind::VAR_DECL);
}

/// `[async] function name(params) { body }`
fn parse_fn_decl(p: &mut Parser) {
    let m = p.open();
    if p.at_contextual("async") {
        p.advance();
    }
    p.advance(); // function
    if p.at(SyntaxKind::IDENT) {
        parse_name(p);
    } else {
        p.error("expected function name");
    }
    parse_param_list(p);
    parse_block(p);
    p.close(m, SyntaxKind::FN_DECL);
}

fn parse_return(p: &mut Parser) {
    let m = p.open();
    p.advance(); // return
    let has_argument = !p.at(SyntaxKind::SEMICOLON)
        && !p.at(SyntaxKind::R_BRACE)
        && !p.at(SyntaxKind::EOF)
        && !p.at_line_break();
    if has_argument {
        expr(p);
    }
    p.consume_semicolon();
    p.close(m, SyntaxKind::RETURN_STMT);
}

fn parse_paren_condition(p: &mut Parser) {
    p.expect(SyntaxKind::L_PAREN);
    expr(p);
    p.expect(SyntaxKind::R_PAREN);
}

fn parse_if(p: &mut Parser) {
    let m = p.open();
    p.advance(); // if
    parse_paren_condition(p);
    parse_stmt(p);
    if p.eat(SyntaxKind::ELSE_KW) {
        parse_stmt(p);
    }
    p.close(m, SyntaxKind::IF_STMT);
}

fn parse_while(p: &mut Parser) {
    let m = p.open();
    p.advance(); // while
    parse_paren_condition(p);
    parse_stmt(p);
    p.close(m, SyntaxKind::WHILE_STMT);
}

fn parse_do_while(p: &mut Parser) {
    let m = p.open();
    p.advance(); // do
    parse_stmt(p);
    p.expect(SyntaxKind::WHILE_KW);
    parse_paren_condition(p);
    p.eat(SyntaxKind::SEMICOLON);
    p.close(m, SyntaxKind::DO_WHILE_STMT);
}

/// `for (init; test; update) body`, `for (x in obj) body` and
/// `for (x of iterable) body`.
fn parse_for(p: &mut Parser) {
    let m = p.open();
    p.advance(); // for
    p.expect(SyntaxKind::L_PAREN);

    if p.at_any(&[SyntaxKind::VAR_KW, SyntaxKind::LET_KW, SyntaxKind::CONST_KW]) {
        p.with_no_in(true, |p| parse_var_decl(p, true));
    } else if !p.at(SyntaxKind::SEMICOLON) {
        p.with_no_in(true, expr);
    }

    if p.at(SyntaxKind::IN_KW) || p.at_contextual("of") {
        p.advance(); // in / of
        expr(p);
        p.expect(SyntaxKind::R_PAREN);
        parse_stmt(p);
        p.close(m, SyntaxKind::FOR_IN_STMT);
        return;
    }

    p.expect(SyntaxKind::SEMICOLON);
    if !p.at(SyntaxKind::SEMICOLON) {
        expr(p);
    }
    p.expect(SyntaxKind::SEMICOLON);
    if !p.at(SyntaxKind::R_PAREN) {
        expr(p);
    }
    p.expect(SyntaxKind::R_PAREN);
    parse_stmt(p);
    p.close(m, SyntaxKind::FOR_STMT);
}

fn parse_switch(p: &mut Parser) {
    let m = p.open();
    p.advance(); // switch
    parse_paren_condition(p);
    p.expect(SyntaxKind::L_BRACE);

    while !p.at(SyntaxKind::R_BRACE) && !p.at(SyntaxKind::EOF) && !p.has_error() {
        let case = p.open();
        if p.eat(SyntaxKind::CASE_KW) {
            expr(p);
        } else {
            p.expect(SyntaxKind::DEFAULT_KW);
        }
        p.expect(SyntaxKind::COLON);
        while !p.at_any(&[
            SyntaxKind::CASE_KW,
            SyntaxKind::DEFAULT_KW,
            SyntaxKind::R_BRACE,
            SyntaxKind::EOF,
        ]) && !p.has_error()
        {
            parse_stmt(p);
        }
        p.close(case, SyntaxKind::SWITCH_CASE);
    }

    p.expect(SyntaxKind::R_BRACE);
    p.close(m, SyntaxKind::SWITCH_STMT);
}

fn parse_try(p: &mut Parser) {
    let m = p.open();
    p.advance(); // try
    parse_block(p);

    let mut has_handler = false;
    if p.at(SyntaxKind::CATCH_KW) {
        has_handler = true;
        let catch = p.open();
        p.advance(); // catch
        if p.eat(SyntaxKind::L_PAREN) {
            parse_binding(p);
            p.expect(SyntaxKind::R_PAREN);
        }
        parse_block(p);
        p.close(catch, SyntaxKind::CATCH_CLAUSE);
    }
    if p.at(SyntaxKind::FINALLY_KW) {
        has_handler = true;
        let finally = p.open();
        p.advance(); // finally
        parse_block(p);
        p.close(finally, SyntaxKind::FINALLY_CLAUSE);
    }
    if !has_handler {
        p.error("expected `catch` or `finally` after `try` block");
    }

    p.close(m, SyntaxKind::TRY_STMT);
}
