// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025 The secpart Authors

/// Number of argument registers used by an FF-A call.
pub const FFA_ARG_REGS: usize = 8;

/// Suspended execution state of the partition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpRegs {
    pub x: [u64; 31],
    pub sp: u64,
    pub pc: u64,
    pub cpsr: u64,
}

impl SpRegs {
    /// Register file for the very first entry into a partition.
    pub fn for_entry(a0: u64, a1: u64, sp: u64, pc: u64) -> Self {
        let mut regs = Self::default();
        regs.x[0] = a0;
        regs.x[1] = a1;
        regs.sp = sp;
        regs.pc = pc;
        regs
    }

    pub fn args(&self) -> [u64; FFA_ARG_REGS] {
        let mut args = [0u64; FFA_ARG_REGS];
        args.copy_from_slice(&self.x[..FFA_ARG_REGS]);
        args
    }

    pub fn set_args(&mut self, args: &[u64; FFA_ARG_REGS]) {
        self.x[..FFA_ARG_REGS].copy_from_slice(args);
    }

    /// Takes over the resumption point of `frame`: its argument registers,
    /// stack pointer, program counter and status register.
    pub fn save_return_state(&mut self, frame: &SpRegs) {
        self.set_args(&frame.args());
        self.sp = frame.sp;
        self.pc = frame.pc;
        self.cpsr = frame.cpsr;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_return_state() {
        let mut regs = SpRegs::for_entry(1, 2, 0x3000, 0x1000);
        regs.x[20] = 0xaa;

        let mut frame = SpRegs::default();
        frame.set_args(&[10, 11, 12, 13, 14, 15, 16, 17]);
        frame.x[8] = 0x55;
        frame.x[20] = 0xbb;
        frame.sp = 0x2f00;
        frame.pc = 0x1234;
        frame.cpsr = 0x3c0;

        regs.save_return_state(&frame);
        assert_eq!(regs.args(), [10, 11, 12, 13, 14, 15, 16, 17]);
        assert_eq!(regs.sp, 0x2f00);
        assert_eq!(regs.pc, 0x1234);
        assert_eq!(regs.cpsr, 0x3c0);
        // Only the call-related state is taken over
        assert_eq!(regs.x[8], 0);
        assert_eq!(regs.x[20], 0xaa);
    }
}
