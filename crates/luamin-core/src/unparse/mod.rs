// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Serialization of parse trees back to Lua source bytes.
//!
//! Every node exposes `write_to`, which emits the node's tokens — each
//! token's prefix trivia followed by its own bytes — recursively in lexical
//! order into an [`io::Write`] sink, returning the number of bytes written
//! and stopping on the first sink error.
//!
//! For an unmodified tree this reproduces the parsed source byte for byte;
//! after rewrites it reproduces whatever bytes the tokens now hold. Writers
//! assume the tree is structurally valid (see the `is_valid` predicates):
//! optional token slots are emitted only when their paired content is
//! present.

use std::io;

use crate::ast::{
    Args, Block, ElseClause, ElseIfClause, Entry, EntryList, Expr, ExprList, File, FuncNameList,
    FunctionExpr, NameList, Stmt, Token,
};

impl Token {
    /// Writes the token's prefix trivia and bytes.
    ///
    /// # Errors
    ///
    /// Propagates the first sink error.
    pub fn write_to<W: io::Write + ?Sized>(&self, w: &mut W) -> io::Result<u64> {
        let mut n = 0u64;
        for prefix in &self.prefix {
            w.write_all(&prefix.bytes)?;
            n += prefix.bytes.len() as u64;
        }
        w.write_all(&self.bytes)?;
        n += self.bytes.len() as u64;
        Ok(n)
    }
}

impl File {
    /// Writes the source-code form of the file.
    ///
    /// # Errors
    ///
    /// Propagates the first sink error.
    pub fn write_to<W: io::Write + ?Sized>(&self, w: &mut W) -> io::Result<u64> {
        let mut n = self.body.write_to(w)?;
        n += self.eof_token.write_to(w)?;
        Ok(n)
    }

    /// Serializes the file into a byte buffer.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)
            .expect("writing to a Vec cannot fail");
        buf
    }
}

impl Block {
    /// Writes each statement followed by its semicolon, if present.
    ///
    /// # Errors
    ///
    /// Propagates the first sink error.
    pub fn write_to<W: io::Write + ?Sized>(&self, w: &mut W) -> io::Result<u64> {
        let mut n = 0;
        for (i, stmt) in self.items.iter().enumerate() {
            n += stmt.write_to(w)?;
            if let Some(sep) = self.seps.get(i) {
                if sep.kind.is_valid() {
                    n += sep.write_to(w)?;
                }
            }
        }
        Ok(n)
    }
}

impl ExprList {
    /// # Errors
    ///
    /// Propagates the first sink error.
    pub fn write_to<W: io::Write + ?Sized>(&self, w: &mut W) -> io::Result<u64> {
        let mut n = 0;
        for (i, expr) in self.items.iter().enumerate() {
            n += expr.write_to(w)?;
            if let Some(sep) = self.seps.get(i) {
                if sep.kind.is_valid() {
                    n += sep.write_to(w)?;
                }
            }
        }
        Ok(n)
    }
}

impl NameList {
    /// # Errors
    ///
    /// Propagates the first sink error.
    pub fn write_to<W: io::Write + ?Sized>(&self, w: &mut W) -> io::Result<u64> {
        let mut n = 0;
        for (i, name) in self.items.iter().enumerate() {
            n += name.write_to(w)?;
            if let Some(sep) = self.seps.get(i) {
                if sep.kind.is_valid() {
                    n += sep.write_to(w)?;
                }
            }
        }
        Ok(n)
    }
}

impl EntryList {
    /// # Errors
    ///
    /// Propagates the first sink error.
    pub fn write_to<W: io::Write + ?Sized>(&self, w: &mut W) -> io::Result<u64> {
        let mut n = 0;
        for (i, entry) in self.items.iter().enumerate() {
            n += entry.write_to(w)?;
            if let Some(sep) = self.seps.get(i) {
                if sep.kind.is_valid() {
                    n += sep.write_to(w)?;
                }
            }
        }
        Ok(n)
    }
}

impl FuncNameList {
    /// # Errors
    ///
    /// Propagates the first sink error.
    pub fn write_to<W: io::Write + ?Sized>(&self, w: &mut W) -> io::Result<u64> {
        let mut n = 0;
        for (i, name) in self.items.iter().enumerate() {
            n += name.write_to(w)?;
            if let Some(sep) = self.seps.get(i) {
                if sep.kind.is_valid() {
                    n += sep.write_to(w)?;
                }
            }
        }
        if self.colon_token.kind.is_valid() {
            n += self.colon_token.write_to(w)?;
            n += self.method_token.write_to(w)?;
        }
        Ok(n)
    }
}

impl FunctionExpr {
    /// Writes the parameter list and body shared by all function forms. The
    /// caller has already written the `function` token and any name.
    fn write_signature_to<W: io::Write + ?Sized>(&self, w: &mut W) -> io::Result<u64> {
        let mut n = self.lparen_token.write_to(w)?;
        if let Some(params) = &self.params {
            n += params.write_to(w)?;
            if self.vararg_sep_token.kind.is_valid() {
                n += self.vararg_sep_token.write_to(w)?;
                n += self.vararg_token.write_to(w)?;
            }
        } else if self.vararg_token.kind.is_valid() {
            n += self.vararg_token.write_to(w)?;
        }
        n += self.rparen_token.write_to(w)?;
        n += self.body.write_to(w)?;
        n += self.end_token.write_to(w)?;
        Ok(n)
    }

    /// # Errors
    ///
    /// Propagates the first sink error.
    pub fn write_to<W: io::Write + ?Sized>(&self, w: &mut W) -> io::Result<u64> {
        let mut n = self.func_token.write_to(w)?;
        n += self.write_signature_to(w)?;
        Ok(n)
    }
}

impl Expr {
    /// # Errors
    ///
    /// Propagates the first sink error.
    pub fn write_to<W: io::Write + ?Sized>(&self, w: &mut W) -> io::Result<u64> {
        match self {
            Self::Number(e) => e.number_token.write_to(w),
            Self::String(e) => e.string_token.write_to(w),
            Self::Nil(e) => e.nil_token.write_to(w),
            Self::Bool(e) => e.bool_token.write_to(w),
            Self::Vararg(e) => e.vararg_token.write_to(w),
            Self::Variable(e) => e.name_token.write_to(w),
            Self::Unop(e) => {
                let mut n = e.unop_token.write_to(w)?;
                n += e.operand.write_to(w)?;
                Ok(n)
            }
            Self::Binop(e) => {
                let mut n = e.left.write_to(w)?;
                n += e.binop_token.write_to(w)?;
                n += e.right.write_to(w)?;
                Ok(n)
            }
            Self::Paren(e) => {
                let mut n = e.lparen_token.write_to(w)?;
                n += e.value.write_to(w)?;
                n += e.rparen_token.write_to(w)?;
                Ok(n)
            }
            Self::Table(e) => {
                let mut n = e.lbrace_token.write_to(w)?;
                n += e.entries.write_to(w)?;
                n += e.rbrace_token.write_to(w)?;
                Ok(n)
            }
            Self::Function(e) => e.write_to(w),
            Self::Field(e) => {
                let mut n = e.value.write_to(w)?;
                n += e.dot_token.write_to(w)?;
                n += e.name_token.write_to(w)?;
                Ok(n)
            }
            Self::Index(e) => {
                let mut n = e.value.write_to(w)?;
                n += e.lbrack_token.write_to(w)?;
                n += e.index.write_to(w)?;
                n += e.rbrack_token.write_to(w)?;
                Ok(n)
            }
            Self::Method(e) => {
                let mut n = e.value.write_to(w)?;
                n += e.colon_token.write_to(w)?;
                n += e.name_token.write_to(w)?;
                n += e.args.write_to(w)?;
                Ok(n)
            }
            Self::Call(e) => {
                let mut n = e.value.write_to(w)?;
                n += e.args.write_to(w)?;
                Ok(n)
            }
        }
    }
}

impl Entry {
    /// # Errors
    ///
    /// Propagates the first sink error.
    pub fn write_to<W: io::Write + ?Sized>(&self, w: &mut W) -> io::Result<u64> {
        match self {
            Self::Index(e) => {
                let mut n = e.lbrack_token.write_to(w)?;
                n += e.key.write_to(w)?;
                n += e.rbrack_token.write_to(w)?;
                n += e.assign_token.write_to(w)?;
                n += e.value.write_to(w)?;
                Ok(n)
            }
            Self::Field(e) => {
                let mut n = e.name_token.write_to(w)?;
                n += e.assign_token.write_to(w)?;
                n += e.value.write_to(w)?;
                Ok(n)
            }
            Self::Value(e) => e.value.write_to(w),
        }
    }
}

impl Args {
    /// # Errors
    ///
    /// Propagates the first sink error.
    pub fn write_to<W: io::Write + ?Sized>(&self, w: &mut W) -> io::Result<u64> {
        match self {
            Self::List(a) => {
                let mut n = a.lparen_token.write_to(w)?;
                if let Some(values) = &a.values {
                    n += values.write_to(w)?;
                }
                n += a.rparen_token.write_to(w)?;
                Ok(n)
            }
            Self::Table(a) => {
                let mut n = a.value.lbrace_token.write_to(w)?;
                n += a.value.entries.write_to(w)?;
                n += a.value.rbrace_token.write_to(w)?;
                Ok(n)
            }
            Self::String(a) => a.value.string_token.write_to(w),
        }
    }
}

impl Stmt {
    /// # Errors
    ///
    /// Propagates the first sink error.
    pub fn write_to<W: io::Write + ?Sized>(&self, w: &mut W) -> io::Result<u64> {
        match self {
            Self::Do(s) => {
                let mut n = s.do_token.write_to(w)?;
                n += s.body.write_to(w)?;
                n += s.end_token.write_to(w)?;
                Ok(n)
            }
            Self::Assign(s) => {
                let mut n = s.left.write_to(w)?;
                n += s.assign_token.write_to(w)?;
                n += s.right.write_to(w)?;
                Ok(n)
            }
            Self::Call(s) => s.call.write_to(w),
            Self::If(s) => {
                let mut n = s.if_token.write_to(w)?;
                n += s.cond.write_to(w)?;
                n += s.then_token.write_to(w)?;
                n += s.body.write_to(w)?;
                for clause in &s.else_if {
                    n += clause.write_to(w)?;
                }
                if let Some(clause) = &s.else_clause {
                    n += clause.write_to(w)?;
                }
                n += s.end_token.write_to(w)?;
                Ok(n)
            }
            Self::NumericFor(s) => {
                let mut n = s.for_token.write_to(w)?;
                n += s.name_token.write_to(w)?;
                n += s.assign_token.write_to(w)?;
                n += s.min.write_to(w)?;
                n += s.max_sep_token.write_to(w)?;
                n += s.max.write_to(w)?;
                if s.step_sep_token.kind.is_valid() {
                    n += s.step_sep_token.write_to(w)?;
                    if let Some(step) = &s.step {
                        n += step.write_to(w)?;
                    }
                }
                n += s.do_token.write_to(w)?;
                n += s.body.write_to(w)?;
                n += s.end_token.write_to(w)?;
                Ok(n)
            }
            Self::GenericFor(s) => {
                let mut n = s.for_token.write_to(w)?;
                n += s.names.write_to(w)?;
                n += s.in_token.write_to(w)?;
                n += s.iterator.write_to(w)?;
                n += s.do_token.write_to(w)?;
                n += s.body.write_to(w)?;
                n += s.end_token.write_to(w)?;
                Ok(n)
            }
            Self::While(s) => {
                let mut n = s.while_token.write_to(w)?;
                n += s.cond.write_to(w)?;
                n += s.do_token.write_to(w)?;
                n += s.body.write_to(w)?;
                n += s.end_token.write_to(w)?;
                Ok(n)
            }
            Self::Repeat(s) => {
                let mut n = s.repeat_token.write_to(w)?;
                n += s.body.write_to(w)?;
                n += s.until_token.write_to(w)?;
                n += s.cond.write_to(w)?;
                Ok(n)
            }
            Self::LocalVar(s) => {
                let mut n = s.local_token.write_to(w)?;
                n += s.names.write_to(w)?;
                if s.assign_token.kind.is_valid() {
                    n += s.assign_token.write_to(w)?;
                    if let Some(values) = &s.values {
                        n += values.write_to(w)?;
                    }
                }
                Ok(n)
            }
            Self::LocalFunction(s) => {
                let mut n = s.local_token.write_to(w)?;
                n += s.func.func_token.write_to(w)?;
                n += s.name_token.write_to(w)?;
                n += s.func.write_signature_to(w)?;
                Ok(n)
            }
            Self::Function(s) => {
                let mut n = s.func.func_token.write_to(w)?;
                n += s.name.write_to(w)?;
                n += s.func.write_signature_to(w)?;
                Ok(n)
            }
            Self::Break(s) => s.break_token.write_to(w),
            Self::Return(s) => {
                let mut n = s.return_token.write_to(w)?;
                if let Some(values) = &s.values {
                    n += values.write_to(w)?;
                }
                Ok(n)
            }
        }
    }
}

impl ElseIfClause {
    /// # Errors
    ///
    /// Propagates the first sink error.
    pub fn write_to<W: io::Write + ?Sized>(&self, w: &mut W) -> io::Result<u64> {
        let mut n = self.else_if_token.write_to(w)?;
        n += self.cond.write_to(w)?;
        n += self.then_token.write_to(w)?;
        n += self.body.write_to(w)?;
        Ok(n)
    }
}

impl ElseClause {
    /// # Errors
    ///
    /// Propagates the first sink error.
    pub fn write_to<W: io::Write + ?Sized>(&self, w: &mut W) -> io::Result<u64> {
        let mut n = self.else_token.write_to(w)?;
        n += self.body.write_to(w)?;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use crate::source_analysis::parse;

    fn round_trip(src: &[u8]) {
        let (file, err) = parse("rt.lua", src);
        assert!(err.is_none(), "parse error in {:?}: {err:?}", src);
        let out = file.to_bytes();
        assert_eq!(
            out,
            src,
            "round trip mismatch:\n got: {}\nwant: {}",
            String::from_utf8_lossy(&out),
            String::from_utf8_lossy(src)
        );
    }

    #[test]
    fn identity_round_trip_preserves_every_byte() {
        round_trip(b"");
        round_trip(b"\n\n-- only comments\n\n");
        round_trip(b"-- a\nlocal x = 1\n");
        round_trip(b"local x,y=1,{a=2;[3]=4,}  -- trailing\n");
        round_trip(b"function t.f:m(p, ...)\n\treturn p\nend\n");
        round_trip(b"for i=1,10,2 do t:m(i) end\nfor k,v in pairs(t) do end\n");
        round_trip(b"while x<y do x=x+1 end ; repeat break until done\n");
        round_trip(b"if a then\nelseif b then --[[ c ]] f()\nelse g'lit'\nend\n");
        round_trip(b"x = [==[ hello ]=] world ]==] .. 'quoted\\n'\n");
        round_trip(b"local f = function(...) return ... end");
        round_trip(b"a.b[c].d, e = (f){g=1}, -#h\n");
    }

    #[test]
    fn write_to_counts_bytes() {
        let src = b"local x = 1 -- c\n";
        let (file, err) = parse("count.lua", src);
        assert!(err.is_none());
        let mut sink = Vec::new();
        let n = file.write_to(&mut sink).unwrap();
        assert_eq!(n, src.len() as u64);
    }

    #[test]
    fn sink_error_stops_emission() {
        use std::io::{self, Write};

        struct FailAfter(usize);
        impl Write for FailAfter {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                if self.0 < buf.len() {
                    return Err(io::Error::other("sink full"));
                }
                self.0 -= buf.len();
                Ok(buf.len())
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let (file, _) = parse("fail.lua", b"local x = 1");
        let err = file.write_to(&mut FailAfter(3)).unwrap_err();
        assert_eq!(err.to_string(), "sink full");
    }
}
