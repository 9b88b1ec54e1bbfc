// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025 The secpart Authors

//! Session entry points of the secure partition.
//!
//! The partition is a single, long-lived instance. The hosting session
//! framework serializes all calls into [`SecurePartition`]; every entry
//! point takes `&mut self` and runs to completion before the next one
//! starts.

extern crate alloc;

use super::context::PartitionContext;
use super::loader::{load_partition, SpImage};
use crate::config::SpConfig;
use crate::decompress::Decompressor;
use crate::error::{SpError, TeeError};
use crate::mm::MappingInfo;
use crate::platform::SpPlatform;
use crate::protocols::ffa::{DirectMsg, EndpointPair, FfaMessage};
use crate::protocols::{PTA_STMM_CMD_COMMUNICATE, STMM_ID, STMM_PTA_ID};
use crate::requests::{run_partition, SpServices};
use crate::storage::StorageRegistry;
use alloc::boxed::Box;
use alloc::vec::Vec;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpState {
    Uninitialized,
    /// Image being loaded, or first entry in progress
    Initializing,
    Ready,
    Destroyed,
}

/// Caller memory passed by reference. `size` is the number of valid bytes
/// in `buf`; it is updated with the required size when the buffer is
/// rejected as too large.
#[derive(Debug)]
pub struct MemRef<'a> {
    pub buf: &'a mut [u8],
    pub size: usize,
}

impl<'a> MemRef<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        let size = buf.len();
        Self { buf, size }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TeeParamType {
    None,
    ValueInput,
    ValueOutput,
    ValueInout,
    MemrefInput,
    MemrefOutput,
    MemrefInout,
}

#[derive(Debug)]
pub enum TeeParam<'a> {
    None,
    ValueInput { a: u32, b: u32 },
    ValueOutput { a: u32, b: u32 },
    ValueInout { a: u32, b: u32 },
    MemrefInput(MemRef<'a>),
    MemrefOutput(MemRef<'a>),
    MemrefInout(MemRef<'a>),
}

impl TeeParam<'_> {
    pub fn param_type(&self) -> TeeParamType {
        match self {
            Self::None => TeeParamType::None,
            Self::ValueInput { .. } => TeeParamType::ValueInput,
            Self::ValueOutput { .. } => TeeParamType::ValueOutput,
            Self::ValueInout { .. } => TeeParamType::ValueInout,
            Self::MemrefInput(_) => TeeParamType::MemrefInput,
            Self::MemrefOutput(_) => TeeParamType::MemrefOutput,
            Self::MemrefInout(_) => TeeParamType::MemrefInout,
        }
    }
}

pub type TeeParams<'a> = [TeeParam<'a>; 4];

fn param_types(params: &TeeParams<'_>) -> [TeeParamType; 4] {
    [
        params[0].param_type(),
        params[1].param_type(),
        params[2].param_type(),
        params[3].param_type(),
    ]
}

/// The secure partition together with everything needed to run it.
#[derive(Debug)]
pub struct SecurePartition {
    config: SpConfig,
    image: SpImage,
    platform: Box<dyn SpPlatform>,
    decompressor: Box<dyn Decompressor>,
    storage: StorageRegistry,
    state: SpState,
    ctx: Option<PartitionContext>,
}

impl SecurePartition {
    pub fn new(
        config: SpConfig,
        image: SpImage,
        platform: Box<dyn SpPlatform>,
        decompressor: Box<dyn Decompressor>,
        storage: StorageRegistry,
    ) -> Self {
        Self {
            config,
            image,
            platform,
            decompressor,
            storage,
            state: SpState::Uninitialized,
            ctx: None,
        }
    }

    pub fn state(&self) -> SpState {
        self.state
    }

    pub fn context(&self) -> Option<&PartitionContext> {
        self.ctx.as_ref()
    }

    fn load_and_boot(&mut self) -> Result<(), SpError> {
        self.config.validate()?;

        let aspace = self.platform.new_address_space()?;
        let mpidr = self.platform.read_mpidr();
        let ctx = self.ctx.insert(PartitionContext::new(aspace));

        load_partition(
            ctx,
            &self.image,
            &self.config,
            self.decompressor.as_ref(),
            mpidr,
        )?;

        let services = SpServices {
            storage: &self.storage,
            owner: self.config.uuid,
            with_vfp: self.config.with_vfp,
        };
        run_partition(self.platform.as_mut(), ctx, &services)
    }

    /// Creates the partition context for `uuid`, loads the image and runs
    /// the partition until it reports back from its first entry.
    ///
    /// On failure the context is destroyed again.
    pub fn init_session(&mut self, uuid: &Uuid) -> Result<(), TeeError> {
        if *uuid != self.config.uuid {
            return Err(TeeError::NotFound);
        }

        match self.state {
            SpState::Ready => return Ok(()),
            SpState::Initializing => return Err(TeeError::BadState),
            SpState::Uninitialized | SpState::Destroyed => {}
        }

        self.state = SpState::Initializing;

        match self.load_and_boot() {
            Ok(()) => {
                self.state = SpState::Ready;
                Ok(())
            }
            Err(e) => {
                log::error!("Partition initialization failed: {:?}", e);
                self.destroy();
                Err(e.into())
            }
        }
    }

    pub fn open_session(&self, params: &TeeParams<'_>) -> Result<(), TeeError> {
        if param_types(params) != [TeeParamType::None; 4] {
            return Err(TeeError::BadParameters);
        }

        match self.state {
            SpState::Ready => Ok(()),
            _ => Err(TeeError::BadState),
        }
    }

    /// Forwards the caller's buffer in `params[0]` to the partition and
    /// returns its reply in place. The partition's response value is stored
    /// in `params[1]`.
    ///
    /// A buffer larger than the comm buffer is rejected with
    /// [`TeeError::ExcessData`] and its size set to the usable capacity.
    pub fn invoke_command(
        &mut self,
        cmd: u32,
        params: &mut TeeParams<'_>,
    ) -> Result<(), TeeError> {
        if cmd != PTA_STMM_CMD_COMMUNICATE {
            return Err(TeeError::BadParameters);
        }

        let [mem, value, TeeParam::None, TeeParam::None] = params else {
            return Err(TeeError::BadParameters);
        };
        let (TeeParam::MemrefInout(mem), TeeParam::ValueOutput { a, .. }) = (mem, value) else {
            return Err(TeeError::BadParameters);
        };

        if self.state != SpState::Ready {
            return Err(TeeError::BadState);
        }

        let services = SpServices {
            storage: &self.storage,
            owner: self.config.uuid,
            with_vfp: self.config.with_vfp,
        };
        let ctx = self.ctx.as_mut().ok_or(TeeError::BadState)?;
        let (comm_buf, capacity) = ctx.ns_comm_buf().ok_or(TeeError::BadState)?;

        if mem.size > capacity {
            mem.size = capacity;
            return Err(TeeError::ExcessData);
        }

        let size = mem.size;
        let data = mem.buf.get_mut(..size).ok_or(TeeError::BadParameters)?;

        let req = DirectMsg::new(
            EndpointPair::new(STMM_PTA_ID, STMM_ID),
            [comm_buf.into(), size as u64, 0, 0, 0],
        );
        ctx.regs.set_args(&FfaMessage::DirectReq(req).encode());

        ctx.aspace_mut().write_bytes(comm_buf, data)?;
        run_partition(self.platform.as_mut(), ctx, &services)?;

        *a = ctx.regs().x[4] as u32;
        ctx.aspace().read_bytes(comm_buf, data)?;

        Ok(())
    }

    pub fn close_session(&mut self) {}

    /// Logs the partition mappings and returns them.
    pub fn dump_state(&self) -> Vec<MappingInfo> {
        self.ctx
            .as_ref()
            .map(PartitionContext::dump_state)
            .unwrap_or_default()
    }

    /// Releases the partition address space and its context.
    pub fn destroy(&mut self) {
        self.ctx = None;
        self.state = SpState::Destroyed;
    }

    /// Instance identifier of the partition, its address space id.
    pub fn get_instance_id(&self) -> Option<u32> {
        self.ctx.as_ref().map(|ctx| ctx.aspace().asid())
    }
}
