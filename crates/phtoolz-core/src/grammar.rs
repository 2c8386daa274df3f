//! Line grammar for ledger headers, postings, price directives and amounts.
//!
//! Parsers yield raw text fields. Dates and decimals are validated by the
//! callers, so syntax errors and value errors stay distinct.

use crate::error::{LedgerError, LedgerResult};
use combine::parser::char::{char, digit, string};
use combine::stream::easy;
use combine::{
    any, attempt, between, choice, eof, look_ahead, many, many1, optional, satisfy, skip_many,
    skip_many1, Parser,
};

type Line<'a> = easy::Stream<&'a str>;

/// Amount as written: sign, digits with separators, optional symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawAmount {
    pub negative: bool,
    pub quantity: String,
    pub symbol: Option<String>,
}

/// Transaction header. `date` is normalized to `Y-M-D`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Header {
    pub date: String,
    pub payee: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Posting {
    pub account: String,
    pub amount: Option<RawAmount>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawPrice {
    pub date: String,
    pub commodity: String,
    pub value: RawAmount,
}

/// `DATE[=AUX] [*|!] [(CODE)] PAYEE [; comment]`
pub(crate) fn parse_header(text: &str) -> LedgerResult<Header> {
    run(header(), text)
}

/// `[*|!] ACCOUNT[  AMOUNT [{lot}] [@ cost] [= assertion]] [; comment]`
///
/// `None` for a comment line.
pub(crate) fn parse_posting(text: &str) -> LedgerResult<Option<Posting>> {
    run(posting(), text)
}

/// `P DATE [TIME] COMMODITY AMOUNT [; comment]`
pub(crate) fn parse_price(text: &str) -> LedgerResult<RawPrice> {
    run(price(), text)
}

pub(crate) fn parse_amount(text: &str) -> LedgerResult<RawAmount> {
    run(
        (blank(), amount(), blank(), eof()).map(|(_, amount, _, _)| amount),
        text,
    )
}

fn run<'a, P>(mut parser: P, text: &'a str) -> LedgerResult<P::Output>
where
    P: Parser<Line<'a>>,
{
    parser
        .parse(easy::Stream(text))
        .map(|(output, _)| output)
        .map_err(|err| {
            let err = err.map_position(|position| position.translate_position(text));
            let message = err
                .to_string()
                .lines()
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
                .join("; ");
            LedgerError::Syntax(message)
        })
}

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

fn is_symbol_char(c: char) -> bool {
    !c.is_ascii_digit() && !c.is_whitespace() && !"-+.,;\"@{}=()".contains(c)
}

fn is_account_char(c: char) -> bool {
    !is_blank(c) && c != ';'
}

fn blank<'a>() -> impl Parser<Line<'a>, Output = ()> {
    skip_many(satisfy(is_blank))
}

fn gap<'a>() -> impl Parser<Line<'a>, Output = ()> {
    skip_many1(satisfy(is_blank))
}

fn comment<'a>() -> impl Parser<Line<'a>, Output = ()> {
    char(';').with(skip_many(any()))
}

fn line_end<'a>() -> impl Parser<Line<'a>, Output = ()> {
    (blank(), optional(comment()), eof()).map(|_| ())
}

fn number<'a>() -> impl Parser<Line<'a>, Output = String> {
    many1::<String, _, _>(digit())
}

fn date_separator<'a>() -> impl Parser<Line<'a>, Output = char> {
    satisfy(|c: char| c == '-' || c == '/')
}

fn date<'a>() -> impl Parser<Line<'a>, Output = String> {
    (number(), date_separator(), number(), date_separator(), number())
        .map(|(year, _, month, _, day)| format!("{year}-{month}-{day}"))
}

fn time<'a>() -> impl Parser<Line<'a>, Output = ()> {
    (
        number(),
        char(':'),
        number(),
        optional((char(':'), number())),
    )
        .map(|_| ())
}

fn status<'a>() -> impl Parser<Line<'a>, Output = char> {
    satisfy(|c: char| c == '*' || c == '!')
}

fn code<'a>() -> impl Parser<Line<'a>, Output = String> {
    between(
        char('('),
        char(')'),
        many::<String, _, _>(satisfy(|c: char| c != ')')),
    )
}

fn quantity<'a>() -> impl Parser<Line<'a>, Output = String> {
    many1::<String, _, _>(satisfy(|c: char| c.is_ascii_digit() || c == '.' || c == ','))
}

fn quoted_symbol<'a>() -> impl Parser<Line<'a>, Output = String> {
    between(
        char('"'),
        char('"'),
        many1::<String, _, _>(satisfy(|c: char| c != '"')),
    )
}

fn symbol<'a>() -> impl Parser<Line<'a>, Output = String> {
    quoted_symbol().or(many1::<String, _, _>(satisfy(is_symbol_char)))
}

/// `10 AAPL`, `-5.82 USD`, `$1,000.50`, `-$5`, `$-5`, `"VWRL.L" 3` or `42`.
fn amount<'a>() -> impl Parser<Line<'a>, Output = RawAmount> {
    let quantity_first = (quantity(), optional(attempt(blank().with(symbol()))))
        .map(|(quantity, symbol)| (false, quantity, symbol));
    let symbol_first = (symbol(), blank(), optional(char('-')), quantity())
        .map(|(symbol, _, sign, quantity)| (sign.is_some(), quantity, Some(symbol)));

    (optional(char('-')), blank(), quantity_first.or(symbol_first)).map(
        |(sign, _, (inner_sign, quantity, symbol))| RawAmount {
            negative: sign.is_some() != inner_sign,
            quantity,
            symbol,
        },
    )
}

fn header<'a>() -> impl Parser<Line<'a>, Output = Header> {
    (
        date(),
        optional((char('='), date())),
        blank(),
        optional(status().skip(blank())),
        optional(code().skip(blank())),
        many::<String, _, _>(satisfy(|c: char| c != ';')),
        line_end(),
    )
        .map(|(date, _, _, _, _, payee, _)| Header {
            date,
            payee: payee.trim_end().to_string(),
        })
}

/// Account names may contain single spaces; two spaces or a tab end them.
fn account<'a>() -> impl Parser<Line<'a>, Output = String> {
    many1::<String, _, _>(
        satisfy(is_account_char)
            .or(attempt(char(' ').skip(look_ahead(satisfy(is_account_char))))),
    )
}

fn separator<'a>() -> impl Parser<Line<'a>, Output = ()> {
    choice((char('\t').map(|_| ()), attempt(string("  ")).map(|_| ()))).skip(blank())
}

/// Lot price, cost or balance assertion trailing an amount.
fn annotation<'a>() -> impl Parser<Line<'a>, Output = ()> {
    satisfy(|c: char| c == '@' || c == '{' || c == '=').with(skip_many(satisfy(|c: char| c != ';')))
}

fn posting_amount<'a>() -> impl Parser<Line<'a>, Output = Option<RawAmount>> {
    choice((
        char('(')
            .with(skip_many(satisfy(|c: char| c != ';')))
            .map(|_| None::<RawAmount>),
        annotation().map(|_| None),
        (amount(), blank(), optional(annotation())).map(|(amount, _, _)| Some(amount)),
    ))
}

fn posting<'a>() -> impl Parser<Line<'a>, Output = Option<Posting>> {
    let entry = (
        optional(status().skip(blank())),
        account(),
        optional(separator().with(optional(posting_amount()))),
        line_end(),
    )
        .map(|(_, account, amount, _)| {
            Some(Posting {
                account,
                amount: amount.flatten().flatten(),
            })
        });

    comment().map(|_| None::<Posting>).or(entry)
}

fn price<'a>() -> impl Parser<Line<'a>, Output = RawPrice> {
    let commodity =
        quoted_symbol().or(many1::<String, _, _>(satisfy(|c: char| {
            !c.is_whitespace() && c != ';' && c != '"'
        })));

    (
        char('P').skip(gap()),
        date().skip(gap()),
        optional(attempt(time().skip(gap()))),
        commodity.skip(gap()),
        amount(),
        line_end(),
    )
        .map(|(_, date, _, commodity, value, _)| RawPrice {
            date,
            commodity,
            value,
        })
}
