//! Byzantium opcode table.

pub(crate) const STOP: u8 = 0x00;
pub(crate) const GAS: u8 = 0x5a;
pub(crate) const POP: u8 = 0x50;
pub(crate) const SSTORE: u8 = 0x55;
pub(crate) const PUSH1: u8 = 0x60;
pub(crate) const PUSH4: u8 = 0x63;
pub(crate) const PUSH20: u8 = 0x73;
pub(crate) const PUSH32: u8 = 0x7f;
pub(crate) const CALL: u8 = 0xf1;
pub(crate) const CALLCODE: u8 = 0xf2;
pub(crate) const DELEGATECALL: u8 = 0xf4;
pub(crate) const STATICCALL: u8 = 0xfa;

/// Call opcodes that take a value operand.
pub(crate) const VALUE_CALLS: [u8; 2] = [CALL, CALLCODE];
/// All call opcodes.
pub(crate) const CALLS: [u8; 4] = [CALL, CALLCODE, DELEGATECALL, STATICCALL];

/// Returns whether `opcode` is defined in Byzantium.
pub(crate) fn is_defined(opcode: u8) -> bool {
    matches!(
        opcode,
        0x00..=0x0b
            | 0x10..=0x1a
            | 0x20
            | 0x30..=0x3e
            | 0x40..=0x45
            | 0x50..=0x5b
            | 0x60..=0xa4
            | 0xf0..=0xf4
            | 0xfa
            | 0xfd..=0xff
    )
}

/// Returns the immediate size of a `PUSHn` opcode, or `None` for every other opcode.
pub(crate) fn push_size(opcode: u8) -> Option<usize> {
    (PUSH1..=PUSH32)
        .contains(&opcode)
        .then(|| usize::from(opcode - PUSH1) + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_matches_byzantium() {
        assert_eq!((0..=255).filter(|&op| is_defined(op)).count(), 135);
        for op in CALLS.into_iter().chain([STOP, GAS, POP, SSTORE, PUSH4, PUSH20]) {
            assert!(is_defined(op), "{op:#04x}");
        }
        assert!(!is_defined(0x1b), "SHL is Constantinople");
        assert!(!is_defined(0xf5), "CREATE2 is Constantinople");
    }

    #[test]
    fn push_sizes() {
        assert_eq!(push_size(PUSH1), Some(1));
        assert_eq!(push_size(PUSH20), Some(20));
        assert_eq!(push_size(PUSH32), Some(32));
        assert_eq!(push_size(CALL), None);
    }
}
