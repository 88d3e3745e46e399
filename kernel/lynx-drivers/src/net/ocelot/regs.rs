//! Symbolic register names of the Ocelot/Felix switch family.
//!
//! A [`Reg`] packs its target block into the top byte and its index within
//! the block into the low 24 bits, so one enum covers every block while
//! each chip supplies its own `[target][index] -> offset` table
//! ([`RegMap`]).

use core::fmt;

use lynx_core::static_assert;

/// Bit position of the target in a [`Reg`] value.
pub const TARGET_OFFSET: u32 = 24;
/// Mask of the per-target index in a [`Reg`] value.
pub const REG_MASK: u32 = (1 << TARGET_OFFSET) - 1;
/// Offset-table entry of a register the chip does not have.
pub const REG_RESERVED: u32 = 0xffff_ffff;

/// Register target blocks.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Target {
    /// Analyzer.
    Ana = 1,
    /// PTP clock.
    Ptp,
    /// Queue system frame injection/extraction.
    Qs,
    /// Queue system.
    Qsys,
    /// Rewriter.
    Rew,
    /// System: counters, reset, port modes.
    Sys,
    /// VCAP IS2 classifier.
    S2,
    /// General configuration block.
    Gcb,
    /// High-speed I/O (SerDes and PLLs).
    Hsio,
}

/// Number of register targets.
pub const TARGET_COUNT: usize = 9;

static_assert!(Target::Hsio as usize == TARGET_COUNT);

impl Target {
    /// Every target, in enum order.
    pub const ALL: [Self; TARGET_COUNT] = [
        Self::Ana,
        Self::Ptp,
        Self::Qs,
        Self::Qsys,
        Self::Rew,
        Self::Sys,
        Self::S2,
        Self::Gcb,
        Self::Hsio,
    ];

    /// Zero-based slot of this target in per-target arrays.
    pub const fn slot(self) -> usize {
        self as usize - 1
    }

    /// Number of registers the enum defines for this target.
    pub const fn reg_count(self) -> usize {
        let last = match self {
            Self::Ana => Reg::AnaPolMiscCfg,
            Self::Ptp => Reg::PtpPinWfLowPeriod,
            Self::Qs => Reg::QsInhDbg,
            Self::Qsys => Reg::QsysGclStatusReg2,
            Self::Rew => Reg::RewPpt,
            Self::Sys => Reg::SysCmData,
            Self::S2 => Reg::S2CacheTgDat,
            Self::Gcb => Reg::GcbSoftRst,
            Self::Hsio => Reg::HsioTempSensorStat,
        };
        last.index() + 1
    }

    const fn from_u8(val: u8) -> Option<Self> {
        match val {
            1 => Some(Self::Ana),
            2 => Some(Self::Ptp),
            3 => Some(Self::Qs),
            4 => Some(Self::Qsys),
            5 => Some(Self::Rew),
            6 => Some(Self::Sys),
            7 => Some(Self::S2),
            8 => Some(Self::Gcb),
            9 => Some(Self::Hsio),
            _ => None,
        }
    }
}

const fn target_base(target: Target) -> u32 {
    (target as u32) << TARGET_OFFSET
}

/// Switch registers, named after the datasheet.
#[allow(missing_docs)]
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reg {
    AnaAdvlearn = target_base(Target::Ana),
    AnaVlanmask,
    AnaPortBDomain,
    AnaAnagefil,
    AnaAnevents,
    AnaStormlimitBurst,
    AnaStormlimitCfg,
    AnaIsolatedPorts,
    AnaCommunityPorts,
    AnaAutoage,
    AnaMactoptions,
    AnaLearndisc,
    AnaAgenctrl,
    AnaMirrorports,
    AnaEmirrorports,
    AnaFlooding,
    AnaFloodingIpmc,
    AnaSflowCfg,
    AnaPortMode,
    AnaCutThruCfg,
    AnaPgidPgid,
    AnaTablesAnmoved,
    AnaTablesMachdata,
    AnaTablesMacldata,
    AnaTablesStreamdata,
    AnaTablesMacaccess,
    AnaTablesMactindx,
    AnaTablesVlanaccess,
    AnaTablesVlantidx,
    AnaTablesIsdxaccess,
    AnaTablesIsdxtidx,
    AnaTablesEntrylim,
    AnaTablesPtpIdHigh,
    AnaTablesPtpIdLow,
    AnaTablesStreamaccess,
    AnaTablesStreamtidx,
    AnaTablesSeqHistory,
    AnaTablesSeqMask,
    AnaTablesSfidMask,
    AnaTablesSfidaccess,
    AnaTablesSfidtidx,
    AnaMstiState,
    AnaOamUpmLmCnt,
    AnaSgAccessCtrl,
    AnaSgConfigReg1,
    AnaSgConfigReg2,
    AnaSgConfigReg3,
    AnaSgConfigReg4,
    AnaSgConfigReg5,
    AnaSgGclGsConfig,
    AnaSgGclTiConfig,
    AnaSgStatusReg1,
    AnaSgStatusReg2,
    AnaSgStatusReg3,
    AnaPortVlanCfg,
    AnaPortDropCfg,
    AnaPortQosCfg,
    AnaPortVcapCfg,
    AnaPortVcapS1KeyCfg,
    AnaPortVcapS2Cfg,
    AnaPortPcpDeiMap,
    AnaPortCpuFwdCfg,
    AnaPortCpuFwdBpduCfg,
    AnaPortCpuFwdGarpCfg,
    AnaPortCpuFwdCcmCfg,
    AnaPortPortCfg,
    AnaPortPolCfg,
    AnaPortPtpCfg,
    AnaPortPtpDly1Cfg,
    AnaPortPtpDly2Cfg,
    AnaPortSfidCfg,
    AnaPfcPfcCfg,
    AnaPfcPfcTimer,
    AnaIptOamMepCfg,
    AnaIptIpt,
    AnaPptPpt,
    AnaFidMapFidMap,
    AnaAggrCfg,
    AnaCpuqCfg,
    AnaCpuqCfg2,
    AnaCpuq8021Cfg,
    AnaDscpCfg,
    AnaDscpRewrCfg,
    AnaVcapRngTypeCfg,
    AnaVcapRngValCfg,
    AnaVrapCfg,
    AnaVrapHdrData,
    AnaVrapHdrMask,
    AnaDiscardCfg,
    AnaFidCfg,
    AnaPolPirCfg,
    AnaPolCirCfg,
    AnaPolModeCfg,
    AnaPolPirState,
    AnaPolCirState,
    AnaPolState,
    AnaPolFlowc,
    AnaPolHyst,
    AnaPolMiscCfg,
    PtpMiscCfg = target_base(Target::Ptp),
    PtpClkAdjCfg,
    PtpClkAdjFrq,
    PtpPinIntr,
    PtpPinIntrEna,
    PtpIntrIdent,
    PtpSysClkCfg,
    PtpCurNsf,
    PtpCurNsec,
    PtpCurSecLsb,
    PtpCurSecMsb,
    PtpPinCfg,
    PtpTodSecMsb,
    PtpTodSecLsb,
    PtpTodNsec,
    PtpNsf,
    PtpPinWfHighPeriod,
    PtpPinWfLowPeriod,
    QsXtrGrpCfg = target_base(Target::Qs),
    QsXtrRd,
    QsXtrFrmPruning,
    QsXtrFlush,
    QsXtrDataPresent,
    QsXtrCfg,
    QsInjGrpCfg,
    QsInjWr,
    QsInjCtrl,
    QsInjStatus,
    QsInjErr,
    QsInhDbg,
    QsysPortMode = target_base(Target::Qsys),
    QsysSwitchPortMode,
    QsysStatCntCfg,
    QsysEeeCfg,
    QsysEeeThres,
    QsysIgrNoSharing,
    QsysEgrNoSharing,
    QsysSwStatus,
    QsysExtCpuCfg,
    QsysPadCfg,
    QsysCpuGroupMap,
    QsysQmap,
    QsysIsdxSgrp,
    QsysTimedFrameEntry,
    QsysTfrmMisc,
    QsysTfrmPortDly,
    QsysTfrmTimerCfg1,
    QsysTfrmTimerCfg2,
    QsysTfrmTimerCfg3,
    QsysTfrmTimerCfg4,
    QsysTfrmTimerCfg5,
    QsysTfrmTimerCfg6,
    QsysTfrmTimerCfg7,
    QsysTfrmTimerCfg8,
    QsysRedProfile,
    QsysResQosMode,
    QsysResCfg,
    QsysResStat,
    QsysEgrDropMode,
    QsysEqCtrl,
    QsysEventsCore,
    QsysQmaxsduCfg0,
    QsysQmaxsduCfg1,
    QsysQmaxsduCfg2,
    QsysQmaxsduCfg3,
    QsysQmaxsduCfg4,
    QsysQmaxsduCfg5,
    QsysQmaxsduCfg6,
    QsysQmaxsduCfg7,
    QsysPreemptionCfg,
    QsysCirCfg,
    QsysEirCfg,
    QsysSeCfg,
    QsysSeDwrrCfg,
    QsysSeConnect,
    QsysSeDlbSense,
    QsysCirState,
    QsysEirState,
    QsysSeState,
    QsysHschMiscCfg,
    QsysTagConfig,
    QsysTasParamCfgCtrl,
    QsysPortMaxSdu,
    QsysParamCfgReg1,
    QsysParamCfgReg2,
    QsysParamCfgReg3,
    QsysParamCfgReg4,
    QsysParamCfgReg5,
    QsysGclCfgReg1,
    QsysGclCfgReg2,
    QsysParamStatusReg1,
    QsysParamStatusReg2,
    QsysParamStatusReg3,
    QsysParamStatusReg4,
    QsysParamStatusReg5,
    QsysParamStatusReg6,
    QsysParamStatusReg7,
    QsysParamStatusReg8,
    QsysParamStatusReg9,
    QsysGclStatusReg1,
    QsysGclStatusReg2,
    RewPortVlanCfg = target_base(Target::Rew),
    RewTagCfg,
    RewPortCfg,
    RewDscpCfg,
    RewPcpDeiQosMapCfg,
    RewPtpCfg,
    RewPtpDly1Cfg,
    RewRedTagCfg,
    RewDscpRemapDp1Cfg,
    RewDscpRemapCfg,
    RewStatCfg,
    RewRewSticky,
    RewPpt,
    SysCountRxOctets = target_base(Target::Sys),
    SysCountRxUnicast,
    SysCountRxMulticast,
    SysCountRxBroadcast,
    SysCountRxShorts,
    SysCountRxFragments,
    SysCountRxJabbers,
    SysCountRxCrcAlignErrs,
    SysCountRxSymErrs,
    SysCountRx64,
    SysCountRx65127,
    SysCountRx128255,
    SysCountRx2561023,
    SysCountRx10241526,
    SysCountRx1527Max,
    SysCountRxPause,
    SysCountRxControl,
    SysCountRxLongs,
    SysCountRxClassifiedDrops,
    SysCountTxOctets,
    SysCountTxUnicast,
    SysCountTxMulticast,
    SysCountTxBroadcast,
    SysCountTxCollision,
    SysCountTxDrops,
    SysCountTxPause,
    SysCountTx64,
    SysCountTx65127,
    SysCountTx128511,
    SysCountTx5121023,
    SysCountTx10241526,
    SysCountTx1527Max,
    SysCountTxAging,
    SysResetCfg,
    SysSrEtypeCfg,
    SysVlanEtypeCfg,
    SysPortMode,
    SysFrontPortMode,
    SysFrmAging,
    SysStatCfg,
    SysSwStatus,
    SysMiscCfg,
    SysRewMacHighCfg,
    SysRewMacLowCfg,
    SysTimestampOffset,
    SysCmid,
    SysPauseCfg,
    SysPauseTotCfg,
    SysAtop,
    SysAtopTotCfg,
    SysMacFcCfg,
    SysMmgt,
    SysMmgtFast,
    SysEventsDif,
    SysEventsCore,
    SysCnt,
    SysPtpStatus,
    SysPtpTxstamp,
    SysPtpNxt,
    SysPtpCfg,
    SysRamInit,
    SysCmAddr,
    SysCmDataWr,
    SysCmDataRd,
    SysCmOp,
    SysCmData,
    HsioPll5gCfg0 = target_base(Target::Hsio),
    HsioPll5gCfg1,
    HsioPll5gCfg2,
    HsioPll5gCfg3,
    HsioPll5gCfg4,
    HsioPll5gCfg5,
    HsioPll5gCfg6,
    HsioPll5gStatus0,
    HsioPll5gStatus1,
    HsioPll5gBistCfg0,
    HsioPll5gBistCfg1,
    HsioPll5gBistCfg2,
    HsioPll5gBistStat0,
    HsioPll5gBistStat1,
    HsioRcompCfg0,
    HsioRcompStatus,
    HsioSyncEthCfg,
    HsioSyncEthPllCfg,
    HsioS1gDesCfg,
    HsioS1gIbCfg,
    HsioS1gObCfg,
    HsioS1gSerCfg,
    HsioS1gCommonCfg,
    HsioS1gPllCfg,
    HsioS1gPllStatus,
    HsioS1gDftCfg0,
    HsioS1gDftCfg1,
    HsioS1gDftCfg2,
    HsioS1gTpCfg,
    HsioS1gRcPllBistCfg,
    HsioS1gMiscCfg,
    HsioS1gDftStatus,
    HsioS1gMiscStatus,
    HsioMcbS1gAddrCfg,
    HsioS6gDigCfg,
    HsioS6gDftCfg0,
    HsioS6gDftCfg1,
    HsioS6gDftCfg2,
    HsioS6gTpCfg0,
    HsioS6gTpCfg1,
    HsioS6gRcPllBistCfg,
    HsioS6gMiscCfg,
    HsioS6gObAnegCfg,
    HsioS6gDftStatus,
    HsioS6gErrCnt,
    HsioS6gMiscStatus,
    HsioS6gDesCfg,
    HsioS6gIbCfg,
    HsioS6gIbCfg1,
    HsioS6gIbCfg2,
    HsioS6gIbCfg3,
    HsioS6gIbCfg4,
    HsioS6gIbCfg5,
    HsioS6gObCfg,
    HsioS6gObCfg1,
    HsioS6gSerCfg,
    HsioS6gCommonCfg,
    HsioS6gPllCfg,
    HsioS6gAcjtagCfg,
    HsioS6gGpCfg,
    HsioS6gIbStatus0,
    HsioS6gIbStatus1,
    HsioS6gAcjtagStatus,
    HsioS6gPllStatus,
    HsioS6gRevid,
    HsioMcbS6gAddrCfg,
    HsioHwCfg,
    HsioHwQsgmiiCfg,
    HsioHwQsgmiiStat,
    HsioClkCfg,
    HsioTempSensorCtrl,
    HsioTempSensorCfg,
    HsioTempSensorStat,
    GcbSoftRst = target_base(Target::Gcb),
    S2CoreUpdateCtrl = target_base(Target::S2),
    S2CoreMvCfg,
    S2CacheEntryDat,
    S2CacheMaskDat,
    S2CacheActionDat,
    S2CacheCntDat,
    S2CacheTgDat,
}

impl Reg {
    /// Target block holding the register.
    pub const fn target(self) -> Target {
        match Target::from_u8(((self as u32) >> TARGET_OFFSET) as u8) {
            Some(t) => t,
            None => panic!("register without target"),
        }
    }

    /// Index of the register within its target.
    pub const fn index(self) -> usize {
        (self as u32 & REG_MASK) as usize
    }

    /// Group and replica strides of register arrays.
    ///
    /// Registers that are not arrays have both strides zero, so indexed
    /// accesses with any index hit the single instance.
    pub const fn stride(self) -> Stride {
        use Reg::*;
        match self {
            AnaPortVlanCfg | AnaPortDropCfg | AnaPortQosCfg | AnaPortVcapCfg
            | AnaPortVcapS2Cfg | AnaPortCpuFwdCfg | AnaPortCpuFwdBpduCfg
            | AnaPortCpuFwdGarpCfg | AnaPortCpuFwdCcmCfg | AnaPortPortCfg
            | AnaPortPolCfg | AnaPortPtpCfg | AnaPortPtpDly1Cfg | AnaPortPtpDly2Cfg
            | AnaPortSfidCfg => Stride::new(0x100, 0),
            AnaPortVcapS1KeyCfg | AnaPortPcpDeiMap => Stride::new(0x100, 0x4),
            AnaPolPirCfg | AnaPolCirCfg | AnaPolModeCfg | AnaPolPirState
            | AnaPolCirState | AnaPolState => Stride::new(0x20, 0),
            AnaPfcPfcCfg => Stride::new(0x40, 0),
            AnaPgidPgid | AnaDscpCfg | AnaDscpRewrCfg | AnaCpuqCfg2 | AnaCpuq8021Cfg
            | AnaMstiState | AnaVcapRngTypeCfg | AnaVcapRngValCfg | AnaPolFlowc
            | AnaIptOamMepCfg | AnaIptIpt => Stride::new(0, 0x4),
            QsXtrGrpCfg | QsXtrRd | QsXtrFrmPruning | QsInjGrpCfg | QsInjWr
            | QsInjCtrl | QsInjErr => Stride::new(0, 0x4),
            QsysPortMode | QsysSwitchPortMode | QsysEeeCfg | QsysIgrNoSharing
            | QsysEgrNoSharing | QsysTimedFrameEntry | QsysRedProfile
            | QsysQmaxsduCfg0 | QsysPortMaxSdu => Stride::new(0, 0x4),
            QsysResCfg => Stride::new(0, 0x8),
            QsysResStat => Stride::new(0, 0x8),
            QsysQmap => Stride::new(0x4, 0),
            QsysCirCfg | QsysEirCfg | QsysSeCfg | QsysSeConnect | QsysSeDlbSense
            | QsysCirState | QsysEirState | QsysSeState => Stride::new(0x100, 0),
            QsysSeDwrrCfg => Stride::new(0x100, 0x4),
            RewPortVlanCfg | RewTagCfg | RewPortCfg | RewDscpCfg | RewPtpCfg
            | RewPtpDly1Cfg => Stride::new(0x80, 0),
            RewPcpDeiQosMapCfg => Stride::new(0x80, 0x4),
            RewDscpRemapDp1Cfg | RewDscpRemapCfg => Stride::new(0, 0x4),
            SysPortMode | SysFrontPortMode | SysPauseCfg | SysAtop | SysMacFcCfg
            | SysRewMacHighCfg | SysRewMacLowCfg | SysCnt => Stride::new(0, 0x4),
            S2CacheEntryDat | S2CacheMaskDat | S2CacheActionDat | S2CacheCntDat => {
                Stride::new(0, 0x4)
            }
            PtpPinCfg | PtpTodSecMsb | PtpTodSecLsb | PtpTodNsec
            | PtpPinWfHighPeriod | PtpPinWfLowPeriod => Stride::new(0x20, 0),
            _ => Stride::new(0, 0),
        }
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Group (`gi`) and replica (`ri`) strides of a register array, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stride {
    /// Bytes between groups.
    pub group: u32,
    /// Bytes between replicas within a group.
    pub replica: u32,
}

impl Stride {
    /// Creates a stride pair.
    pub const fn new(group: u32, replica: u32) -> Self {
        Self { group, replica }
    }

    /// Byte offset of instance `(gi, ri)`, or `None` if it does not fit in
    /// 32 bits.
    pub const fn offset(self, gi: u32, ri: u32) -> Option<u32> {
        let (Some(g), Some(r)) = (self.group.checked_mul(gi), self.replica.checked_mul(ri)) else {
            return None;
        };
        g.checked_add(r)
    }
}

/// Named bit fields of switch registers.
#[allow(missing_docs)]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegField {
    AnaAdvlearnVlanChk,
    AnaAdvlearnLearnMirror,
    AnaAneventsFloodDiscard,
    AnaAneventsMstiDrop,
    AnaAneventsAclkill,
    AnaAneventsAclused,
    AnaAneventsAutoage,
    AnaAneventsVs2ttl1,
    AnaAneventsStormDrop,
    AnaAneventsLearnDrop,
    AnaAneventsAgedEntry,
    AnaAneventsCpuLearnFailed,
    AnaAneventsAutoLearnFailed,
    AnaAneventsLearnRemove,
    AnaAneventsAutoLearned,
    AnaAneventsAutoMoved,
    AnaAneventsDropped,
    AnaAneventsClassifiedDrop,
    AnaAneventsClassifiedCopy,
    AnaAneventsVlanDiscard,
    AnaAneventsFwdDiscard,
    AnaAneventsMulticastFlood,
    AnaAneventsUnicastFlood,
    AnaAneventsDestKnown,
    AnaAneventsBucket3Match,
    AnaAneventsBucket2Match,
    AnaAneventsBucket1Match,
    AnaAneventsBucket0Match,
    AnaAneventsCpuOperation,
    AnaAneventsDmacLookup,
    AnaAneventsSmacLookup,
    AnaAneventsSeqGenErr0,
    AnaAneventsSeqGenErr1,
    AnaTablesMacaccessBDom,
    AnaTablesMactindxBucket,
    AnaTablesMactindxMIndex,
    QsysTimedFrameEntryTfrmVld,
    QsysTimedFrameEntryTfrmFp,
    QsysTimedFrameEntryTfrmPortno,
    QsysTimedFrameEntryTfrmTmSel,
    QsysTimedFrameEntryTfrmTmT,
    SysResetCfgCoreEna,
    SysResetCfgMemEna,
    SysResetCfgMemInit,
    GcbSoftRstSwcRst,
    AnaTablesStreamdataSfid0,
    AnaTablesStreamdataSfidValid0,
    AnaTablesSfidtidxSfidIndex0,
    AnaSgAccessCtrlConfigChange0,
    AnaSgAccessCtrlSgid0,
    AnaSgConfigReg3GateEnable0,
    QsysTasParamCfgCtrlPortNum0,
    QsysGclStatusReg1GclEntryNum0,
    QsysGclCfgReg1GateState0,
    QsysGclCfgReg1GclEntryNum0,
    QsysTasParamCfgCtrlConfigChange0,
    QsysTagConfigEnable0,
    SysStatCfgStatView0,
}

/// Number of [`RegField`] variants.
pub const REGFIELD_COUNT: usize = RegField::SysStatCfgStatView0 as usize + 1;

/// Placement of a [`RegField`] on a chip: bits `lsb..=msb` of `reg`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDesc {
    /// Register holding the field.
    pub reg: Reg,
    /// Lowest bit.
    pub lsb: u8,
    /// Highest bit (inclusive).
    pub msb: u8,
}

impl FieldDesc {
    /// Describes bits `lsb..=msb` of `reg`.
    pub const fn new(reg: Reg, lsb: u8, msb: u8) -> Self {
        assert!(lsb <= msb && msb < 32);
        Self { reg, lsb, msb }
    }

    /// In-register mask of the field.
    pub const fn mask(self) -> u32 {
        lynx_core::bits::genmask(self.msb as u32, self.lsb as u32)
    }
}

/// A chip's `[target][index] -> offset` table.
///
/// Each target slice may be shorter than [`Target::reg_count`]; missing and
/// [`REG_RESERVED`] entries are registers the chip does not have.
#[derive(Debug, Clone, Copy)]
pub struct RegMap {
    /// One offset slice per target, in [`Target::ALL`] order.
    pub targets: [&'static [u32]; TARGET_COUNT],
}

impl RegMap {
    /// Byte offset of `reg` within its target, or `None` if reserved.
    pub fn offset(&self, reg: Reg) -> Option<u32> {
        let off = *self.targets[reg.target().slot()].get(reg.index())?;
        (off != REG_RESERVED).then_some(off)
    }
}

/// Builds the offset table of one target from `(register, offset)` pairs.
///
/// Every register must belong to `target`; the check runs at compile time
/// when used in a `static`.
pub const fn target_map<const N: usize>(target: Target, entries: &[(Reg, u32)]) -> [u32; N] {
    let mut out = [REG_RESERVED; N];
    let mut i = 0;
    while i < entries.len() {
        let (reg, off) = entries[i];
        assert!(reg.target() as u8 == target as u8, "register in wrong target");
        out[reg.index()] = off;
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_packs_target_and_index() {
        assert_eq!(Reg::AnaAdvlearn as u32, 1 << TARGET_OFFSET);
        assert_eq!(Reg::AnaVlanmask as u32, (1 << TARGET_OFFSET) | 1);
        assert_eq!(Reg::SysResetCfg.target(), Target::Sys);
        assert_eq!(Reg::GcbSoftRst as u32, 8 << TARGET_OFFSET);
        assert_eq!(Reg::S2CoreUpdateCtrl.target(), Target::S2);
        assert_eq!(Reg::HsioPll5gCfg0.index(), 0);
    }

    #[test]
    fn target_lengths() {
        assert_eq!(Target::Gcb.reg_count(), 1);
        assert_eq!(Target::Qs.reg_count(), 12);
        assert_eq!(Target::S2.reg_count(), 7);
        for t in Target::ALL {
            assert!(t.reg_count() > 0);
            assert_eq!(Target::ALL[t.slot()], t);
        }
    }

    #[test]
    fn strides() {
        assert_eq!(Reg::AnaPortVlanCfg.stride().offset(3, 0), Some(0x300));
        assert_eq!(Reg::AnaPgidPgid.stride().offset(0, 63), Some(63 * 4));
        assert_eq!(Reg::AnaPortPcpDeiMap.stride().offset(2, 5), Some(0x200 + 0x14));
        assert_eq!(Reg::SysResetCfg.stride().offset(7, 7), Some(0));
        assert_eq!(Reg::AnaPgidPgid.stride().offset(0, u32::MAX / 2), None);
        assert_eq!(Reg::AnaPortPcpDeiMap.stride().offset(u32::MAX, 0), None);
        assert_eq!(Stride::new(0x100, 4).offset(0xffff_ff00 / 0x100, 0x40), None);
    }

    #[test]
    fn field_masks() {
        assert_eq!(FieldDesc::new(Reg::AnaTablesMactindx, 10, 11).mask(), 0xc00);
        assert_eq!(FieldDesc::new(Reg::SysResetCfg, 0, 0).mask(), 0x1);
        assert_eq!(REGFIELD_COUNT, 58);
    }

    #[test]
    fn regmap_lookup() {
        static ANA: [u32; 2] = target_map(Target::Ana, &[(Reg::AnaVlanmask, 0x9004)]);
        let map = RegMap {
            targets: [&ANA, &[], &[], &[], &[], &[], &[], &[], &[]],
        };
        assert_eq!(map.offset(Reg::AnaVlanmask), Some(0x9004));
        assert_eq!(map.offset(Reg::AnaAdvlearn), None);
        assert_eq!(map.offset(Reg::AnaPolMiscCfg), None);
        assert_eq!(map.offset(Reg::SysResetCfg), None);
    }
}
