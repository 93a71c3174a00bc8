//! Integration tests for end-to-end compilation.
//!
//! These tests verify that the complete pipeline works correctly from
//! source code through tokenization, parsing, type checking, code
//! generation and execution against an in-memory output sink.

use monkey::{
    errors::errors::{ErrorImpl, PipelineError, RuntimeFault},
    pipeline::{compile, run, CompileOptions},
    vm::vm::execute,
};

fn run_with(source: &str, options: &CompileOptions) -> (Result<(), PipelineError>, String) {
    let mut output = Vec::new();
    let result = run(source, options, &mut output);

    (result, String::from_utf8(output).unwrap())
}

fn run_source(source: &str) -> (Result<(), PipelineError>, String) {
    run_with(source, &CompileOptions::default())
}

/// Runs a program that must succeed and returns what it printed.
fn output_of(source: &str) -> String {
    let (result, output) = run_source(source);
    if let Err(err) = result {
        panic!("program failed: {}", err);
    }
    output
}

fn semantic_errors(source: &str) -> Vec<String> {
    match run_source(source) {
        (Err(PipelineError::Semantic(errors)), output) => {
            assert!(output.is_empty(), "no output expected, got {:?}", output);
            errors
        }
        (other, _) => panic!("expected semantic errors, got {:?}", other),
    }
}

#[test]
fn test_add_function() {
    let source = "
fn add(a: int, b: int): int { return a + b }

fn main() {
    let x: int = add(3, 4)
    print(x)
}
";
    assert_eq!(output_of(source), "7\n");
}

#[test]
fn test_string_concatenation() {
    let source = "
fn main() {
    let s: string = \"a\" + \"b\"
    print(s)
}
";
    assert_eq!(output_of(source), "ab\n");
}

#[test]
fn test_mixed_addition_is_one_semantic_error() {
    let errors = semantic_errors("fn main() {\n    let n: int = \"a\" + 1\n    print(n)\n}");

    assert_eq!(errors.len(), 1, "{:?}", errors);
    assert!(errors[0].starts_with("Line 2: "));
}

#[test]
fn test_missing_return_and_bad_index_are_rejected() {
    let errors = semantic_errors("fn f(): int { }\n\nfn main() {\n    print(1)\n    f()[0]\n}");

    assert_eq!(
        errors,
        vec![
            "Line 1: Function 'f' must return a value of type int",
            "Line 5: Cannot index type int",
        ]
    );
}

#[test]
fn test_array_index_in_and_out_of_range() {
    let source = "
fn main() {
    let arr: array<int> = [1, 2, 3]
    print(arr[1])
    print(arr[5])
}
";
    let (result, output) = run_source(source);

    assert_eq!(output, "2\n");
    assert!(matches!(
        result,
        Err(PipelineError::Runtime(RuntimeFault::IndexOutOfRange { index: 5, length: 3 }))
    ));
}

#[test]
fn test_fresh_compilations_do_not_share_globals() {
    let options = CompileOptions::default();
    let first = compile("let counter: int = 1\nfn main() { print(counter) }", &options).unwrap();
    let second = compile("let other: string = \"two\"\nfn main() { print(other) }", &options).unwrap();

    assert_eq!(second.globals.len(), 1);
    assert_eq!(second.globals[0].as_ref(), "other");

    for (program, expected) in [(&first, "1\n"), (&second, "two\n"), (&first, "1\n")] {
        let mut output = Vec::new();
        execute(program, &mut output, 100).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), expected);
    }
}

#[test]
fn test_mutual_recursion_in_either_order() {
    let even_first = "
fn is_even(n: int): bool {
    if n == 0 { return true }
    return is_odd(n - 1)
}

fn is_odd(n: int): bool {
    if n == 0 { return false }
    return is_even(n - 1)
}

fn main() {
    print(is_even(10))
    print(is_odd(7))
}
";
    let odd_first = "
fn is_odd(n: int): bool {
    if n == 0 { return false }
    return is_even(n - 1)
}

fn is_even(n: int): bool {
    if n == 0 { return true }
    return is_odd(n - 1)
}

fn main() {
    print(is_even(10))
    print(is_odd(7))
}
";
    assert_eq!(output_of(even_first), "true\ntrue\n");
    assert_eq!(output_of(odd_first), output_of(even_first));
}

#[test]
fn test_recursive_fibonacci() {
    let source = "
fn fib(n: int): int {
    if n < 2 { return n }
    return fib(n - 1) + fib(n - 2)
}

fn main() { print(fib(15)) }
";
    assert_eq!(output_of(source), "610\n");
}

#[test]
fn test_globals_are_initialized_before_main() {
    let source = "
let base: int = 10
let doubled: int = base * 2
let seven: int = make_seven()

fn make_seven(): int { return 7 }
fn add_base(n: int): int { return n + base }

fn main() {
    print(add_base(doubled))
    print(seven)
}
";
    assert_eq!(output_of(source), "30\n7\n");
}

#[test]
fn test_if_else_and_shadowing() {
    let source = "
fn classify(n: int): string {
    if n < 0 { return \"negative\" }
    if n == 0 { return \"zero\" } else { return \"positive\" }
}

fn main() {
    let label: string = \"outer\"
    if true {
        let label: int = 1
        print(label)
    }
    print(label)
    print(classify(0 - 5))
    print(classify(0))
    print(classify(5))
}
";
    assert_eq!(output_of(source), "1\nouter\nnegative\nzero\npositive\n");
}

#[test]
fn test_void_function_with_bare_return() {
    let source = "
fn greet(name: string): void {
    if name == \"\" { return }
    print(\"hello \" + name)
}

fn main() {
    greet(\"\")
    greet(\"monkey\")
}
";
    assert_eq!(output_of(source), "hello monkey\n");
}

#[test]
fn test_returning_a_void_call() {
    let source = "
fn log(message: string): void { print(message) }
fn forward(message: string): void { return log(message) }

fn main() {
    forward(\"forwarded\")
    print(1)
}
";
    assert_eq!(output_of(source), "forwarded\n1\n");
}

#[test]
fn test_void_values_never_reach_code_generation() {
    let takes_void = "fn takes(x: void): int { return 1 }";
    let cases = [
        ("", "print(nothing() == nothing())"),
        ("", "print(nothing() < 1)"),
        ("", "let a: array<void> = [nothing()]"),
        ("", "print([nothing(), nothing()])"),
        ("", "let h: hash<int, void> = {1: nothing()}"),
        ("", "print({\"k\": nothing()})"),
        (takes_void, "print(takes(nothing()))"),
        (takes_void, "let f: fn(void): int = takes"),
        ("", "let g: fn(): int = fn(): int { return nothing() }"),
        ("", "print(len([nothing()]))"),
    ];

    for (declarations, body) in cases {
        let source = format!("fn nothing(): void {{ }}\n{}\nfn main() {{\n{}\n}}", declarations, body);

        match run_source(&source) {
            (Err(PipelineError::Semantic(errors)), output) => {
                assert!(!errors.is_empty());
                assert!(output.is_empty());
            }
            (other, _) => panic!("{:?} for `{}`", other, body),
        }
    }
}

#[test]
fn test_accepted_programs_generate() {
    let sources = [
        "fn nothing(): void { }\nfn main() { return nothing() }",
        "fn nothing(): void { }\nfn main() { nothing() }",
        "fn pick(flag: bool): fn(): void {\n    if flag { return fn(): void { print(1) } }\n    return fn(): void { }\n}\nfn main() { pick(true)() }",
        "let empty: hash<string, array<int>> = {}\nfn main() { print(empty) }",
        "fn main() { { let inner: int = 1 print(inner) } }",
    ];

    for source in sources {
        let (result, _) = run_source(source);
        assert!(result.is_ok(), "{:?} for `{}`", result, source);
    }
}

#[test]
fn test_builtins() {
    let source = "
fn main() {
    let xs: array<int> = [1, 2, 3]
    let ys: array<int> = push(xs, 4)
    print(len(ys))
    print(xs)
    print(ys)
    print(first(ys))
    print(last(ys))
    print(rest(ys))

    let words: array<string> = [\"hi\", \"there\"]
    print(first(words))
    print(push(words, \"!\"))
    print(len(\"monkey\"))
}
";
    assert_eq!(
        output_of(source),
        "4\n[1, 2, 3]\n[1, 2, 3, 4]\n1\n4\n[2, 3, 4]\nhi\n[\"hi\", \"there\", \"!\"]\n6\n"
    );
}

#[test]
fn test_first_of_empty_array_faults() {
    let (result, _) = run_source("fn main() {\n    let empty: array<int> = []\n    print(first(empty))\n}");

    assert!(matches!(
        result,
        Err(PipelineError::Runtime(RuntimeFault::EmptyArray { .. }))
    ));
}

#[test]
fn test_hashes() {
    let source = "
fn main() {
    let h: hash<string, int> = {\"one\": 1, \"two\": 2, \"one\": 11}
    print(h[\"one\"])
    print(h)

    let names: hash<int, string> = {}
    print(names)
    print(h[\"three\"])
}
";
    let (result, output) = run_source(source);

    assert_eq!(output, "11\n{\"one\": 11, \"two\": 2}\n{}\n");
    assert!(matches!(
        result,
        Err(PipelineError::Runtime(RuntimeFault::KeyNotFound { .. }))
    ));
}

#[test]
fn test_function_values() {
    let source = "
let offset: int = 100

fn apply(f: fn(int): int, x: int): int { return f(x) }
fn twice(n: int): int { return n * 2 }

fn main() {
    let square: fn(int): int = fn(n: int): int { return n * n }
    print(apply(square, 5))
    print(apply(twice, 5))
    print(apply(fn(n: int): int { return n + offset }, 5))
    print(square)

    let size: fn(array<int>): int = len
    print(size([1, 2]))
}
";
    assert_eq!(output_of(source), "25\n10\n105\n<fn <lambda#1>>\n2\n");
}

#[test]
fn test_function_literal_cannot_capture_locals() {
    let errors = semantic_errors(
        "fn main() {\n    let x: int = 1\n    let f: fn(): int = fn(): int { return x }\n    print(f())\n}",
    );

    assert_eq!(errors, vec!["Line 3: Function literal cannot capture local 'x'"]);
}

#[test]
fn test_collections_print_nested_values() {
    let source = "
fn main() {
    print(['a', 'b'])
    print([[1, 2], [3]])
    print({1: [true, false]})
    print(\"plain\")
    print('c')
}
";
    assert_eq!(
        output_of(source),
        "['a', 'b']\n[[1, 2], [3]]\n{1: [true, false]}\nplain\nc\n"
    );
}

#[test]
fn test_equality_on_collections() {
    let source = "
fn main() {
    print([1, 2] == [1, 2])
    print({\"a\": 1} != {\"a\": 2})
    print(\"abc\" < \"abd\")
    print('z' >= 'a')
}
";
    assert_eq!(output_of(source), "true\ntrue\ntrue\ntrue\n");
}

#[test]
fn test_division_by_zero() {
    let (result, _) = run_source("fn main() {\n    let zero: int = 0\n    print(1 / zero)\n}");

    assert!(matches!(result, Err(PipelineError::Runtime(RuntimeFault::DivisionByZero))));
}

#[test]
fn test_unbounded_recursion_hits_call_depth() {
    let options = CompileOptions {
        max_call_depth: 100,
        ..CompileOptions::default()
    };
    let (result, _) = run_with(
        "fn down(n: int): int { return down(n + 1) }\nfn main() { print(down(0)) }",
        &options,
    );

    assert!(matches!(
        result,
        Err(PipelineError::Runtime(RuntimeFault::StackOverflow { limit: 100 }))
    ));
}

#[test]
fn test_syntax_errors_stop_the_pipeline() {
    let (result, output) = run_source("fn helper(): int { return 1 }");

    assert!(output.is_empty());
    match result {
        Err(PipelineError::Syntax(err)) => assert_eq!(err.get_kind(), &ErrorImpl::MissingMain),
        other => panic!("expected a syntax error, got {:?}", other),
    }
}

#[test]
fn test_dump_bytecode() {
    let options = CompileOptions {
        dump_bytecode: true,
        ..CompileOptions::default()
    };
    let (result, output) = run_with("fn main() { print(1 + 2) }", &options);

    assert!(result.is_ok());
    assert!(output.starts_with("entry: <entry>"));
    assert!(output.contains("add.int"));
    assert!(output.ends_with("3\n"));
}

#[test]
fn test_comments_and_semicolons() {
    let source = "
// leading comment
fn main() {
    /* block
       comment */
    let a: int = 1; let b: int = 2;
    print(a + b); // trailing
}
";
    assert_eq!(output_of(source), "3\n");
}
