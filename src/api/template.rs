//! Relative path templates with positional, percent-encoded substitution.
//!
//! A template such as `repos/{0}/{1}/releases` is rendered against an ordered
//! argument list. Every argument is encoded on its own before it is spliced
//! in, so a value like `a/b?c` can never add a path segment or a query.

use std::fmt;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::error::TemplateArityError;

/// Bytes left unescaped inside a substituted argument: RFC 3986 unreserved.
const PATH_ARG: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Literal(&'a str),
    Arg(usize),
}

/// A parsed path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePath<'a> {
    template: &'a str,
    segments: Vec<Segment<'a>>,
    arity: usize,
}

impl<'a> ResourcePath<'a> {
    /// Splits `template` into literal text and `{n}` placeholders. Braces are
    /// reserved: an unterminated `{`, a stray `}`, a placeholder that is not a
    /// decimal index, and indices that skip a number are all rejected.
    pub fn parse(template: &'a str) -> Result<Self, TemplateArityError> {
        let malformed = |position: usize| TemplateArityError::Malformed {
            template: template.to_string(),
            position,
        };

        let mut segments = Vec::new();
        let mut placeholders: Vec<(usize, usize)> = Vec::new();
        let mut literal_start = 0;
        let mut offset = 0;

        while let Some(found) = template[offset..].find(['{', '}']) {
            let at = offset + found;
            if template.as_bytes()[at] == b'}' {
                return Err(malformed(at));
            }

            let body_start = at + 1;
            let close = template[body_start..]
                .find('}')
                .map(|len| body_start + len)
                .ok_or_else(|| malformed(at))?;
            let body = &template[body_start..close];
            if body.is_empty() || !body.bytes().all(|b| b.is_ascii_digit()) {
                return Err(malformed(at));
            }
            let index = body.parse::<usize>().map_err(|_| malformed(at))?;

            if at > literal_start {
                segments.push(Segment::Literal(&template[literal_start..at]));
            }
            segments.push(Segment::Arg(index));
            placeholders.push((index, at));
            literal_start = close + 1;
            offset = close + 1;
        }
        if literal_start < template.len() {
            segments.push(Segment::Literal(&template[literal_start..]));
        }

        let mut indices: Vec<usize> = placeholders.iter().map(|(index, _)| *index).collect();
        indices.sort_unstable();
        indices.dedup();
        let arity = indices.len();
        if let Some((_, at)) = placeholders.iter().find(|(index, _)| *index >= arity) {
            return Err(malformed(*at));
        }

        Ok(Self {
            template,
            segments,
            arity,
        })
    }

    pub fn template(&self) -> &'a str {
        self.template
    }

    /// Number of distinct placeholders.
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Renders the template. Fails when the argument count differs from the
    /// placeholder count.
    pub fn render(&self, args: &[&dyn fmt::Display]) -> Result<String, TemplateArityError> {
        let arity_error = || TemplateArityError::Count {
            template: self.template.to_string(),
            expected: self.arity,
            actual: args.len(),
        };

        if args.len() != self.arity {
            return Err(arity_error());
        }

        let encoded: Vec<String> = args
            .iter()
            .map(|arg| utf8_percent_encode(&arg.to_string(), PATH_ARG).to_string())
            .collect();

        let mut out = String::with_capacity(self.template.len() + 16);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Arg(index) => out.push_str(encoded.get(*index).ok_or_else(arity_error)?),
            }
        }
        Ok(out)
    }
}

/// Parses and renders `template` in one step.
pub fn render(template: &str, args: &[&dyn fmt::Display]) -> Result<String, TemplateArityError> {
    ResourcePath::parse(template)?.render(args)
}
