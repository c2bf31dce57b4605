use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use urcl_studio::urcl::{Emulator, Parser};

const PROGRAM: &str = r#"
    IMM R1 0
    IMM R2 10
    IMM R3 1

.LOOP
    ADD R1 R1 R3
    MLT R4 R1 R2
    DIV R5 R4 R2
    AND R6 R1 R2
    OR R7 R1 R2
    XOR R8 R1 R2
    LSH R9 R1 1
    RSH R10 R1 1
    CPY R11 R1
    BGE .SKIP R2 R1
.SKIP
    CAL .ADD_ONE
    BNE .LOOP R1 R2
    HLT

.ADD_ONE
    INC R12 R12
    RET
"#;

fn parsed_program() -> urcl_studio::urcl::ParseOutcome {
    let outcome = Parser::parse(PROGRAM, "bench");
    assert!(outcome.is_ok(), "bench program failed to parse: {:?}", outcome.errors);
    outcome
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("URCL_execution");

    group.bench_function("step_into_one_iteration", |b| {
        b.iter_batched(
            || {
                let outcome = parsed_program();
                let mut emulator = Emulator::new(u64::MAX);
                emulator
                    .load_program_rom(outcome.program.clone())
                    .expect("bench program has no undefined ports");
                emulator
            },
            |mut emulator| {
                // Run past the register setup and once around the loop body,
                // without touching CAL/RET/branch so every opcode above gets
                // ticked the same number of times per call.
                for _ in 0..13 {
                    black_box(emulator.step_into());
                }
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("execute_to_halt", |b| {
        b.iter_batched(
            || {
                let outcome = parsed_program();
                let mut emulator = Emulator::new(u64::MAX);
                emulator
                    .load_program_rom(outcome.program.clone())
                    .expect("bench program has no undefined ports");
                emulator
            },
            |mut emulator| {
                emulator.execute();
                black_box(emulator.pc());
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("parse_program", |b| {
        b.iter_batched(|| PROGRAM, |program| black_box(Parser::parse(program, "bench")), BatchSize::SmallInput);
    });

    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
