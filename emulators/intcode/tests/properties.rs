use intcode::decode::split_word;
use intcode::{Memory, Opcode, Parameter, ParameterMode, Word};
use proptest::prelude::*;

fn mode() -> impl Strategy<Value = ParameterMode> {
    prop_oneof![
        Just(ParameterMode::Position),
        Just(ParameterMode::Immediate),
        Just(ParameterMode::Relative),
    ]
}

fn digit(mode: ParameterMode) -> Word {
    match mode {
        ParameterMode::Position => 0,
        ParameterMode::Immediate => 1,
        ParameterMode::Relative => 2,
    }
}

proptest! {
    #[test]
    fn unwritten_cells_read_zero(
        program in prop::collection::vec(any::<i32>().prop_map(Word::from), 0..32),
        offset in 0usize..512,
    ) {
        let mut memory = Memory::from_program(&program);
        let addr = (program.len() + offset) as Word;
        prop_assert_eq!(memory.get(addr).unwrap(), 0);
        prop_assert_eq!(memory.get(addr).unwrap(), 0);
        prop_assert_eq!(memory.len(), program.len() + offset + 1);
    }

    #[test]
    fn write_past_end_zero_fills(
        program in prop::collection::vec(any::<Word>(), 1..32),
        offset in 0usize..256,
        value in any::<Word>(),
    ) {
        let mut memory = Memory::from_program(&program);
        let k = program.len() + offset;
        memory.set(k as Word, value).unwrap();
        prop_assert_eq!(memory.len(), k + 1);
        let cells: Vec<Word> = memory.cells().collect();
        prop_assert_eq!(&cells[..program.len()], &program[..]);
        prop_assert!(cells[program.len()..k].iter().all(|&cell| cell == 0));
        prop_assert_eq!(memory.get(k as Word).unwrap(), value);
    }

    #[test]
    fn relative_read_matches_positional_read(
        cells in prop::collection::vec(any::<Word>(), 1..64),
        base in -64i64..64,
        raw in -64i64..64,
    ) {
        let target = base + raw;
        prop_assume!(target >= 0);
        let mut relative = Memory::from_program(&cells);
        let mut positional = relative.clone();
        let via_base = Parameter::new(raw, ParameterMode::Relative)
            .read(&mut relative, base)
            .unwrap();
        let direct = Parameter::new(target, ParameterMode::Position)
            .read(&mut positional, 0)
            .unwrap();
        prop_assert_eq!(via_base, direct);
        prop_assert_eq!(relative, positional);
    }

    #[test]
    fn instruction_words_split_back_into_parts(
        index in 0..Opcode::ALL.len(),
        modes in prop::collection::vec(mode(), 0..4),
    ) {
        let opcode = Opcode::ALL[index];
        let word = modes
            .iter()
            .rev()
            .fold(0, |acc, &m| acc * 10 + digit(m))
            * 100
            + opcode.code();
        let (decoded, decoded_modes) = split_word(word).unwrap();
        prop_assert_eq!(decoded, opcode);

        let mut expected = modes.clone();
        while expected.last() == Some(&ParameterMode::Position) {
            expected.pop();
        }
        prop_assert_eq!(decoded_modes, expected);
    }
}
