// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025 The secpart Authors

//! FF-A messages exchanged with the partition.
//!
//! Every call from or into the partition is carried in the argument
//! registers x0..x7: the function id in x0, the packed endpoint ids in x1
//! and up to five argument words in x3..x7. [`FfaMessage`] is the decoded
//! form of such a register file.

use crate::vmm::FFA_ARG_REGS;

pub const FFA_ERROR: u64 = 0x8400_0060;
pub const FFA_VERSION: u64 = 0x8400_0063;
pub const FFA_MSG_SEND_DIRECT_REQ_64: u64 = 0xC400_006F;
pub const FFA_MSG_SEND_DIRECT_RESP_64: u64 = 0xC400_0070;

pub const FFA_VERSION_MAJOR: u16 = 1;
pub const FFA_VERSION_MINOR: u16 = 0;

pub const FFA_PARAM_MBZ: u64 = 0;

/// Number of argument words carried by a direct message.
pub const DIRECT_MSG_ARGS: usize = 5;

pub const fn make_ffa_version(major: u16, minor: u16) -> u32 {
    ((major as u32) << 16) | minor as u32
}

/// Source and destination endpoint ids, packed as `src << 16 | dst`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EndpointPair {
    pub src: u16,
    pub dst: u16,
}

impl EndpointPair {
    pub const fn new(src: u16, dst: u16) -> Self {
        Self { src, dst }
    }

    pub const fn from_reg(reg: u64) -> Self {
        Self {
            src: (reg >> 16) as u16,
            dst: reg as u16,
        }
    }

    pub const fn to_reg(self) -> u64 {
        ((self.src as u64) << 16) | self.dst as u64
    }

    /// Endpoint pair of the reply to a message sent with this pair.
    pub const fn swapped(self) -> Self {
        Self {
            src: self.dst,
            dst: self.src,
        }
    }
}

/// Payload of a direct request or direct response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DirectMsg {
    pub endpoints: EndpointPair,
    pub args: [u64; DIRECT_MSG_ARGS],
}

impl DirectMsg {
    pub const fn new(endpoints: EndpointPair, args: [u64; DIRECT_MSG_ARGS]) -> Self {
        Self { endpoints, args }
    }

    /// Builds the direct response to this request, carrying `ret_val` as its
    /// first argument word.
    pub const fn response(&self, ret_val: u32) -> FfaMessage {
        FfaMessage::DirectResp(DirectMsg {
            endpoints: self.endpoints.swapped(),
            args: [ret_val as u64, 0, 0, 0, 0],
        })
    }

    /// Builds an error reply to this request.
    pub const fn error(&self, code: i32) -> FfaMessage {
        FfaMessage::Error {
            endpoints: self.endpoints.swapped(),
            code,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FfaMessage {
    /// Version negotiation, carrying the caller's version
    Version { input: u32 },
    DirectReq(DirectMsg),
    DirectResp(DirectMsg),
    Error { endpoints: EndpointPair, code: i32 },
    /// Any function id this core does not implement
    Unknown(u64),
}

impl FfaMessage {
    pub fn decode(regs: &[u64; FFA_ARG_REGS]) -> Self {
        let direct = || {
            let mut args = [0u64; DIRECT_MSG_ARGS];
            args.copy_from_slice(&regs[3..]);
            DirectMsg::new(EndpointPair::from_reg(regs[1]), args)
        };

        match regs[0] {
            FFA_VERSION => Self::Version {
                input: regs[1] as u32,
            },
            FFA_MSG_SEND_DIRECT_REQ_64 => Self::DirectReq(direct()),
            FFA_MSG_SEND_DIRECT_RESP_64 => Self::DirectResp(direct()),
            FFA_ERROR => Self::Error {
                endpoints: EndpointPair::from_reg(regs[1]),
                code: regs[2] as i32,
            },
            fid => Self::Unknown(fid),
        }
    }

    /// Encodes the message into argument registers. Unused registers are
    /// zeroed.
    ///
    /// `Version` and `Unknown` only make sense as incoming calls and encode
    /// their function id alone.
    pub fn encode(&self) -> [u64; FFA_ARG_REGS] {
        let mut regs = [FFA_PARAM_MBZ; FFA_ARG_REGS];

        match self {
            Self::Version { input } => {
                regs[0] = FFA_VERSION;
                regs[1] = u64::from(*input);
            }
            Self::DirectReq(msg) | Self::DirectResp(msg) => {
                regs[0] = if matches!(self, Self::DirectReq(_)) {
                    FFA_MSG_SEND_DIRECT_REQ_64
                } else {
                    FFA_MSG_SEND_DIRECT_RESP_64
                };
                regs[1] = msg.endpoints.to_reg();
                regs[3..].copy_from_slice(&msg.args);
            }
            Self::Error { endpoints, code } => {
                regs[0] = FFA_ERROR;
                regs[1] = endpoints.to_reg();
                regs[2] = u64::from(*code as u32);
            }
            Self::Unknown(fid) => regs[0] = *fid,
        }

        regs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_packing() {
        let pair = EndpointPair::from_reg(0x0002_0001);
        assert_eq!(pair, EndpointPair::new(2, 1));
        assert_eq!(pair.swapped().to_reg(), 0x0001_0002);
        // Upper bits beyond the two ids are ignored
        assert_eq!(EndpointPair::from_reg(0xdead_0003_0004), EndpointPair::new(3, 4));
    }

    #[test]
    fn test_decode_direct_req() {
        let regs = [FFA_MSG_SEND_DIRECT_REQ_64, 0x0001_0003, 0, 0xC400_0064, 0x4000, 2, 5, 7];
        let msg = FfaMessage::decode(&regs);
        assert_eq!(
            msg,
            FfaMessage::DirectReq(DirectMsg::new(
                EndpointPair::new(1, 3),
                [0xC400_0064, 0x4000, 2, 5, 7]
            ))
        );
        assert_eq!(msg.encode(), regs);
    }

    #[test]
    fn test_response_swaps_ids() {
        let req = DirectMsg::new(EndpointPair::new(1, 4), [0xC400_0066, 0, 0, 0, 0]);
        let regs = req.response(0x1234).encode();
        assert_eq!(regs[0], FFA_MSG_SEND_DIRECT_RESP_64);
        assert_eq!(regs[1], 0x0004_0001);
        assert_eq!(regs[2], FFA_PARAM_MBZ);
        assert_eq!(regs[3], 0x1234);
        assert_eq!(&regs[4..], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_error_encoding() {
        let req = DirectMsg::new(EndpointPair::new(1, 9), [0; 5]);
        let regs = req.error(-2).encode();
        assert_eq!(regs[0], FFA_ERROR);
        assert_eq!(regs[1], 0x0009_0001);
        assert_eq!(regs[2], 0xffff_fffe);
        assert_eq!(
            FfaMessage::decode(&regs),
            FfaMessage::Error {
                endpoints: EndpointPair::new(9, 1),
                code: -2
            }
        );
    }

    #[test]
    fn test_decode_version_and_unknown() {
        let mut regs = [0u64; FFA_ARG_REGS];
        regs[0] = FFA_VERSION;
        regs[1] = 0x0001_0001;
        assert_eq!(FfaMessage::decode(&regs), FfaMessage::Version { input: 0x0001_0001 });

        regs[0] = 0x8400_00ff;
        assert_eq!(FfaMessage::decode(&regs), FfaMessage::Unknown(0x8400_00ff));
        assert_eq!(make_ffa_version(1, 0), 0x0001_0000);
    }
}
