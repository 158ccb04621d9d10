// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Parameter lists of `def` and `lambda`.

use pyfront_core::Span;

use super::AstBuilder;
use crate::ast::{Arg, Expr, ParameterList};
use crate::parser::PResult;

/// `a, b=1, /` : positional-only parameters where at least one has a default.
#[derive(Debug, Default)]
pub struct SlashWithDefault {
    pub plain: Vec<Arg>,
    pub defaulted: Vec<(Arg, Expr)>,
}

/// `*args, kwonly=1, **kwargs` and its variations.
#[derive(Debug, Default)]
pub struct StarEtc {
    pub vararg: Option<Arg>,
    pub kwonly: Vec<(Arg, Option<Expr>)>,
    pub kwarg: Option<Arg>,
}

/// The groups of a parameter list as the grammar recognizes them.
#[derive(Debug, Default)]
pub struct ParamParts {
    pub slash_no_default: Vec<Arg>,
    pub slash_with_default: Option<SlashWithDefault>,
    pub no_default: Vec<Arg>,
    pub with_default: Vec<(Arg, Expr)>,
    pub star_etc: Option<StarEtc>,
}

/// One entry of a parameter list scanned without structure, used only to
/// explain why a list failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawParam {
    Plain { span: Span, has_default: bool },
    Slash(Span),
    Star { span: Span, named: bool, has_default: bool },
    DoubleStar { span: Span, has_default: bool },
}

impl RawParam {
    fn span(&self) -> Span {
        match *self {
            RawParam::Plain { span, .. }
            | RawParam::Slash(span)
            | RawParam::Star { span, .. }
            | RawParam::DoubleStar { span, .. } => span,
        }
    }
}

impl AstBuilder<'_> {
    pub fn arg(&self, name: &str, annotation: Option<Expr>, type_comment: Option<String>, span: Span) -> Arg {
        Arg {
            arg: name.to_string(),
            annotation: annotation.map(Box::new),
            type_comment,
            span,
        }
    }

    /// Merge the recognized groups into a [`ParameterList`]. Defaults of
    /// positional parameters line up with the tail of
    /// `posonlyargs ++ args`.
    pub fn parameters(&self, parts: ParamParts) -> ParameterList {
        let ParamParts {
            slash_no_default,
            slash_with_default,
            no_default,
            with_default,
            star_etc,
        } = parts;

        let mut posonlyargs = slash_no_default;
        let mut defaults = Vec::new();
        if let Some(SlashWithDefault { plain, defaulted }) = slash_with_default {
            posonlyargs.extend(plain);
            for (arg, default) in defaulted {
                posonlyargs.push(arg);
                defaults.push(default);
            }
        }

        let mut args = no_default;
        for (arg, default) in with_default {
            args.push(arg);
            defaults.push(default);
        }

        let StarEtc {
            vararg,
            kwonly,
            kwarg,
        } = star_etc.unwrap_or_default();
        let (kwonlyargs, kw_defaults) = kwonly.into_iter().unzip();

        ParameterList {
            posonlyargs,
            args,
            vararg: vararg.map(Box::new),
            kwonlyargs,
            kw_defaults,
            kwarg: kwarg.map(Box::new),
            defaults,
        }
    }

    /// Report the first structural problem in a raw parameter scan. Returns
    /// `Ok(())` when the scan shows nothing specific to report.
    pub fn check_raw_parameters(&self, raw: &[RawParam]) -> PResult<()> {
        let mut seen_slash = false;
        let mut seen_star = false;
        let mut seen_default = false;
        let mut after_kwarg = false;
        for (i, param) in raw.iter().enumerate() {
            if after_kwarg {
                return Err(self.error(
                    "arguments cannot follow var-keyword argument",
                    param.span(),
                ));
            }
            match *param {
                RawParam::Slash(span) => {
                    if seen_slash {
                        return Err(self.error("/ may appear only once", span));
                    }
                    if seen_star {
                        return Err(self.error("/ must be ahead of *", span));
                    }
                    if i == 0 {
                        return Err(self.error("at least one argument must precede /", span));
                    }
                    seen_slash = true;
                }
                RawParam::Star {
                    span,
                    named,
                    has_default,
                } => {
                    if seen_star {
                        return Err(self.error("* argument may appear only once", span));
                    }
                    if has_default {
                        return Err(self.error(
                            "var-positional argument cannot have default value",
                            span,
                        ));
                    }
                    if !named && matches!(raw.get(i + 1), None | Some(RawParam::DoubleStar { .. })) {
                        return Err(self.error("named arguments must follow bare *", span));
                    }
                    seen_star = true;
                }
                RawParam::DoubleStar { span, has_default } => {
                    if has_default {
                        return Err(self.error(
                            "var-keyword argument cannot have default value",
                            span,
                        ));
                    }
                    after_kwarg = true;
                }
                RawParam::Plain { span, has_default } => {
                    if seen_star {
                        continue;
                    }
                    if has_default {
                        seen_default = true;
                    } else if seen_default {
                        return Err(self.error(
                            "non-default argument follows default argument",
                            span,
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}
