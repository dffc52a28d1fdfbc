#![no_main]

use core::fmt;

use itertools::Itertools;
use libfuzzer_sys::{arbitrary::Arbitrary, fuzz_target};

// Builtins, constants and loads from variables
#[derive(Arbitrary, Debug)]
enum PlotscriptAtom {
    Add, Sub, Mul, Div,
    Sqrt, Pow, Ln, Sin, Cos, Tan,
    Real, Imag, Mag, Arg, Conj,
    First, Rest, Length, Append, Join, Range,
    Pi, E, I,

    Identifier(String),
    Text(String),
    Number(f64),
}

impl fmt::Display for PlotscriptAtom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", match self {
            PlotscriptAtom::Add => "+",
            PlotscriptAtom::Sub => "-",
            PlotscriptAtom::Mul => "*",
            PlotscriptAtom::Div => "/",
            PlotscriptAtom::Sqrt => "sqrt",
            PlotscriptAtom::Pow => "^",
            PlotscriptAtom::Ln => "ln",
            PlotscriptAtom::Sin => "sin",
            PlotscriptAtom::Cos => "cos",
            PlotscriptAtom::Tan => "tan",
            PlotscriptAtom::Real => "real",
            PlotscriptAtom::Imag => "imag",
            PlotscriptAtom::Mag => "mag",
            PlotscriptAtom::Arg => "arg",
            PlotscriptAtom::Conj => "conj",
            PlotscriptAtom::First => "first",
            PlotscriptAtom::Rest => "rest",
            PlotscriptAtom::Length => "length",
            PlotscriptAtom::Append => "append",
            PlotscriptAtom::Join => "join",
            PlotscriptAtom::Range => "range",
            PlotscriptAtom::Pi => "pi",
            PlotscriptAtom::E => "e",
            PlotscriptAtom::I => "I",
            PlotscriptAtom::Identifier(identifier) => identifier,
            PlotscriptAtom::Text(text) => return write!(f, "\"{}\"", text),
            PlotscriptAtom::Number(value) => return write!(f, "{}", value),
        })
    }
}

#[derive(Arbitrary, Debug)]
enum PlotscriptCommand {
    Begin(Vec<PlotscriptCommand>),
    Define(Vec<PlotscriptCommand>),
    List(Vec<PlotscriptCommand>),
    Lambda(Vec<PlotscriptCommand>),
    Apply(Vec<PlotscriptCommand>),
    Map(Vec<PlotscriptCommand>),
    SetProperty(Vec<PlotscriptCommand>),
    GetProperty(Vec<PlotscriptCommand>),
    Call(PlotscriptAtom, Vec<PlotscriptCommand>),

    Atom(PlotscriptAtom),
}

fn stringify_arguments(values: &[PlotscriptCommand]) -> String {
    values.iter()
        .map(PlotscriptCommand::to_string)
        .join(" ")
}

impl fmt::Display for PlotscriptCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (head, arguments) = match self {
            PlotscriptCommand::Atom(atom) => return atom.fmt(f),
            PlotscriptCommand::Call(atom, arguments) => return write!(f, "({} {})", atom, stringify_arguments(arguments)),
            PlotscriptCommand::Begin(arguments) => ("begin", arguments),
            PlotscriptCommand::Define(arguments) => ("define", arguments),
            PlotscriptCommand::List(arguments) => ("list", arguments),
            PlotscriptCommand::Lambda(arguments) => ("lambda", arguments),
            PlotscriptCommand::Apply(arguments) => ("apply", arguments),
            PlotscriptCommand::Map(arguments) => ("map", arguments),
            PlotscriptCommand::SetProperty(arguments) => ("set-property", arguments),
            PlotscriptCommand::GetProperty(arguments) => ("get-property", arguments),
        };

        write!(f, "({} {})", head, stringify_arguments(arguments))
    }
}

fuzz_target!(|commands: Vec<PlotscriptCommand>| {
    let mut interpreter = plotscript::Interpreter::new();

    for command in commands {
        let _ = interpreter.evaluate_str(&command.to_string());
    }
});
