//! VSC7514 register layout.

use super::regs::{FieldDesc, Reg, RegField, RegMap, Target, REGFIELD_COUNT, target_map};
use super::ChipDesc;

static ANA: [u32; Target::Ana.reg_count()] = target_map(
    Target::Ana,
    &[
        (Reg::AnaAdvlearn, 0x009000),
        (Reg::AnaVlanmask, 0x009004),
        (Reg::AnaPortBDomain, 0x009008),
        (Reg::AnaAnagefil, 0x00900c),
        (Reg::AnaAnevents, 0x009010),
        (Reg::AnaStormlimitBurst, 0x009014),
        (Reg::AnaStormlimitCfg, 0x009018),
        (Reg::AnaIsolatedPorts, 0x009028),
        (Reg::AnaCommunityPorts, 0x00902c),
        (Reg::AnaAutoage, 0x009030),
        (Reg::AnaMactoptions, 0x009034),
        (Reg::AnaLearndisc, 0x009038),
        (Reg::AnaAgenctrl, 0x00903c),
        (Reg::AnaMirrorports, 0x009040),
        (Reg::AnaEmirrorports, 0x009044),
        (Reg::AnaFlooding, 0x009048),
        (Reg::AnaFloodingIpmc, 0x00904c),
        (Reg::AnaSflowCfg, 0x009050),
        (Reg::AnaPortMode, 0x009080),
        (Reg::AnaPgidPgid, 0x008c00),
        (Reg::AnaTablesAnmoved, 0x008b30),
        (Reg::AnaTablesMachdata, 0x008b34),
        (Reg::AnaTablesMacldata, 0x008b38),
        (Reg::AnaTablesMacaccess, 0x008b3c),
        (Reg::AnaTablesMactindx, 0x008b40),
        (Reg::AnaTablesVlanaccess, 0x008b44),
        (Reg::AnaTablesVlantidx, 0x008b48),
        (Reg::AnaTablesIsdxaccess, 0x008b4c),
        (Reg::AnaTablesIsdxtidx, 0x008b50),
        (Reg::AnaTablesEntrylim, 0x008b00),
        (Reg::AnaTablesPtpIdHigh, 0x008b54),
        (Reg::AnaTablesPtpIdLow, 0x008b58),
        (Reg::AnaMstiState, 0x008e00),
        (Reg::AnaPortVlanCfg, 0x007000),
        (Reg::AnaPortDropCfg, 0x007004),
        (Reg::AnaPortQosCfg, 0x007008),
        (Reg::AnaPortVcapCfg, 0x00700c),
        (Reg::AnaPortVcapS1KeyCfg, 0x007010),
        (Reg::AnaPortVcapS2Cfg, 0x00701c),
        (Reg::AnaPortPcpDeiMap, 0x007020),
        (Reg::AnaPortCpuFwdCfg, 0x007060),
        (Reg::AnaPortCpuFwdBpduCfg, 0x007064),
        (Reg::AnaPortCpuFwdGarpCfg, 0x007068),
        (Reg::AnaPortCpuFwdCcmCfg, 0x00706c),
        (Reg::AnaPortPortCfg, 0x007070),
        (Reg::AnaPortPolCfg, 0x007074),
        (Reg::AnaPortPtpCfg, 0x007078),
        (Reg::AnaPortPtpDly1Cfg, 0x00707c),
        (Reg::AnaPortPtpDly2Cfg, 0x007080),
        (Reg::AnaPfcPfcCfg, 0x008800),
        (Reg::AnaPfcPfcTimer, 0x008804),
        (Reg::AnaIptOamMepCfg, 0x008000),
        (Reg::AnaIptIpt, 0x008004),
        (Reg::AnaPptPpt, 0x008ac0),
        (Reg::AnaFidMapFidMap, 0x000000),
        (Reg::AnaAggrCfg, 0x0090b4),
        (Reg::AnaCpuqCfg, 0x0090b8),
        (Reg::AnaCpuqCfg2, 0x0090bc),
        (Reg::AnaCpuq8021Cfg, 0x0090c0),
        (Reg::AnaDscpCfg, 0x009100),
        (Reg::AnaDscpRewrCfg, 0x009200),
        (Reg::AnaVcapRngTypeCfg, 0x009240),
        (Reg::AnaVcapRngValCfg, 0x009260),
        (Reg::AnaVrapCfg, 0x009280),
        (Reg::AnaVrapHdrData, 0x009284),
        (Reg::AnaVrapHdrMask, 0x009288),
        (Reg::AnaDiscardCfg, 0x00928c),
        (Reg::AnaFidCfg, 0x009290),
        (Reg::AnaPolPirCfg, 0x004000),
        (Reg::AnaPolCirCfg, 0x004004),
        (Reg::AnaPolModeCfg, 0x004008),
        (Reg::AnaPolPirState, 0x00400c),
        (Reg::AnaPolCirState, 0x004010),
        (Reg::AnaPolState, 0x004014),
        (Reg::AnaPolFlowc, 0x008b80),
        (Reg::AnaPolHyst, 0x008bec),
        (Reg::AnaPolMiscCfg, 0x008bf0),
    ],
);

static QS: [u32; Target::Qs.reg_count()] = target_map(
    Target::Qs,
    &[
        (Reg::QsXtrGrpCfg, 0x000),
        (Reg::QsXtrRd, 0x008),
        (Reg::QsXtrFrmPruning, 0x010),
        (Reg::QsXtrFlush, 0x018),
        (Reg::QsXtrDataPresent, 0x01c),
        (Reg::QsXtrCfg, 0x020),
        (Reg::QsInjGrpCfg, 0x024),
        (Reg::QsInjWr, 0x02c),
        (Reg::QsInjCtrl, 0x034),
        (Reg::QsInjStatus, 0x03c),
        (Reg::QsInjErr, 0x040),
        (Reg::QsInhDbg, 0x048),
    ],
);

static QSYS: [u32; Target::Qsys.reg_count()] = target_map(
    Target::Qsys,
    &[
        (Reg::QsysPortMode, 0x011200),
        (Reg::QsysSwitchPortMode, 0x011234),
        (Reg::QsysStatCntCfg, 0x011264),
        (Reg::QsysEeeCfg, 0x011268),
        (Reg::QsysEeeThres, 0x011294),
        (Reg::QsysIgrNoSharing, 0x011298),
        (Reg::QsysEgrNoSharing, 0x01129c),
        (Reg::QsysSwStatus, 0x0112a0),
        (Reg::QsysExtCpuCfg, 0x0112d0),
        (Reg::QsysPadCfg, 0x0112d4),
        (Reg::QsysCpuGroupMap, 0x0112d8),
        (Reg::QsysQmap, 0x0112dc),
        (Reg::QsysIsdxSgrp, 0x011400),
        (Reg::QsysTimedFrameEntry, 0x014000),
        (Reg::QsysTfrmMisc, 0x011310),
        (Reg::QsysTfrmPortDly, 0x011314),
        (Reg::QsysRedProfile, 0x011338),
        (Reg::QsysResQosMode, 0x011378),
        (Reg::QsysResCfg, 0x012000),
        (Reg::QsysResStat, 0x012004),
        (Reg::QsysEgrDropMode, 0x01137c),
        (Reg::QsysEqCtrl, 0x011380),
        (Reg::QsysEventsCore, 0x011384),
        (Reg::QsysCirCfg, 0x000000),
        (Reg::QsysEirCfg, 0x000004),
        (Reg::QsysSeCfg, 0x000008),
        (Reg::QsysSeDwrrCfg, 0x00000c),
        (Reg::QsysSeConnect, 0x00003c),
        (Reg::QsysSeDlbSense, 0x000040),
        (Reg::QsysCirState, 0x000044),
        (Reg::QsysEirState, 0x000048),
        (Reg::QsysSeState, 0x00004c),
        (Reg::QsysHschMiscCfg, 0x011388),
    ],
);

static REW: [u32; Target::Rew.reg_count()] = target_map(
    Target::Rew,
    &[
        (Reg::RewPortVlanCfg, 0x000000),
        (Reg::RewTagCfg, 0x000004),
        (Reg::RewPortCfg, 0x000008),
        (Reg::RewDscpCfg, 0x00000c),
        (Reg::RewPcpDeiQosMapCfg, 0x000010),
        (Reg::RewPtpCfg, 0x000050),
        (Reg::RewPtpDly1Cfg, 0x000054),
        (Reg::RewDscpRemapDp1Cfg, 0x000690),
        (Reg::RewDscpRemapCfg, 0x000790),
        (Reg::RewStatCfg, 0x000890),
        (Reg::RewPpt, 0x000680),
    ],
);

static SYS: [u32; Target::Sys.reg_count()] = target_map(
    Target::Sys,
    &[
        (Reg::SysCountRxOctets, 0x000000),
        (Reg::SysCountRxUnicast, 0x000004),
        (Reg::SysCountRxMulticast, 0x000008),
        (Reg::SysCountRxBroadcast, 0x00000c),
        (Reg::SysCountRxShorts, 0x000010),
        (Reg::SysCountRxFragments, 0x000014),
        (Reg::SysCountRxJabbers, 0x000018),
        (Reg::SysCountTxOctets, 0x000100),
        (Reg::SysCountTxUnicast, 0x000104),
        (Reg::SysCountTxMulticast, 0x000108),
        (Reg::SysCountTxBroadcast, 0x00010c),
        (Reg::SysCountTxCollision, 0x000110),
        (Reg::SysCountTxDrops, 0x000114),
        (Reg::SysResetCfg, 0x000508),
        (Reg::SysCmid, 0x00050c),
        (Reg::SysVlanEtypeCfg, 0x000510),
        (Reg::SysPortMode, 0x000514),
        (Reg::SysFrontPortMode, 0x000548),
        (Reg::SysFrmAging, 0x000574),
        (Reg::SysStatCfg, 0x000578),
        (Reg::SysSwStatus, 0x00057c),
        (Reg::SysMiscCfg, 0x0005ac),
        (Reg::SysRewMacHighCfg, 0x0005b0),
        (Reg::SysRewMacLowCfg, 0x0005dc),
        (Reg::SysCmAddr, 0x000500),
        (Reg::SysCmData, 0x000504),
        (Reg::SysPauseCfg, 0x000608),
        (Reg::SysPauseTotCfg, 0x000638),
        (Reg::SysAtop, 0x00063c),
        (Reg::SysAtopTotCfg, 0x00066c),
        (Reg::SysMacFcCfg, 0x000670),
        (Reg::SysMmgt, 0x00069c),
        (Reg::SysMmgtFast, 0x0006a0),
        (Reg::SysEventsDif, 0x0006a4),
        (Reg::SysEventsCore, 0x0006b4),
        (Reg::SysCnt, 0x000000),
        (Reg::SysPtpStatus, 0x0006b8),
        (Reg::SysPtpTxstamp, 0x0006bc),
        (Reg::SysPtpNxt, 0x0006c0),
        (Reg::SysPtpCfg, 0x0006c4),
    ],
);

static S2: [u32; Target::S2.reg_count()] = target_map(
    Target::S2,
    &[
        (Reg::S2CoreUpdateCtrl, 0x000000),
        (Reg::S2CoreMvCfg, 0x000004),
        (Reg::S2CacheEntryDat, 0x000008),
        (Reg::S2CacheMaskDat, 0x000108),
        (Reg::S2CacheActionDat, 0x000208),
        (Reg::S2CacheCntDat, 0x000308),
        (Reg::S2CacheTgDat, 0x000388),
    ],
);

static GCB: [u32; Target::Gcb.reg_count()] =
    target_map(Target::Gcb, &[(Reg::GcbSoftRst, 0x000004)]);

static PTP: [u32; Target::Ptp.reg_count()] = target_map(
    Target::Ptp,
    &[
        (Reg::PtpPinCfg, 0x000000),
        (Reg::PtpTodSecMsb, 0x000004),
        (Reg::PtpTodSecLsb, 0x000008),
        (Reg::PtpTodNsec, 0x00000c),
        (Reg::PtpPinWfHighPeriod, 0x000018),
        (Reg::PtpPinWfLowPeriod, 0x00001c),
        (Reg::PtpMiscCfg, 0x0000a0),
        (Reg::PtpClkAdjCfg, 0x0000a4),
        (Reg::PtpClkAdjFrq, 0x0000a8),
    ],
);

static HSIO: [u32; Target::Hsio.reg_count()] = target_map(
    Target::Hsio,
    &[
        (Reg::HsioPll5gCfg0, 0x000000),
        (Reg::HsioPll5gCfg1, 0x000004),
        (Reg::HsioPll5gCfg2, 0x000008),
        (Reg::HsioPll5gCfg3, 0x00000c),
        (Reg::HsioPll5gCfg4, 0x000010),
        (Reg::HsioPll5gCfg5, 0x000014),
        (Reg::HsioPll5gCfg6, 0x000018),
        (Reg::HsioPll5gStatus0, 0x00001c),
        (Reg::HsioPll5gStatus1, 0x000020),
    ],
);

const fn fields() -> [Option<FieldDesc>; REGFIELD_COUNT] {
    use RegField as F;

    let mut f = [None; REGFIELD_COUNT];
    f[F::AnaAdvlearnVlanChk as usize] = Some(FieldDesc::new(Reg::AnaAdvlearn, 11, 11));
    f[F::AnaAdvlearnLearnMirror as usize] = Some(FieldDesc::new(Reg::AnaAdvlearn, 0, 10));

    // ANEVENTS bits 27 (MSTI_DROP) down to 0 (SMAC_LOOKUP), in enum order.
    let mut ev = F::AnaAneventsMstiDrop as usize;
    let mut bit = 27;
    while ev <= F::AnaAneventsSmacLookup as usize {
        f[ev] = Some(FieldDesc::new(Reg::AnaAnevents, bit, bit));
        ev += 1;
        bit = bit.saturating_sub(1);
    }

    f[F::AnaTablesMacaccessBDom as usize] = Some(FieldDesc::new(Reg::AnaTablesMacaccess, 18, 18));
    f[F::AnaTablesMactindxBucket as usize] = Some(FieldDesc::new(Reg::AnaTablesMactindx, 10, 11));
    f[F::AnaTablesMactindxMIndex as usize] = Some(FieldDesc::new(Reg::AnaTablesMactindx, 0, 9));
    f[F::QsysTimedFrameEntryTfrmVld as usize] =
        Some(FieldDesc::new(Reg::QsysTimedFrameEntry, 20, 20));
    f[F::QsysTimedFrameEntryTfrmFp as usize] =
        Some(FieldDesc::new(Reg::QsysTimedFrameEntry, 8, 19));
    f[F::QsysTimedFrameEntryTfrmPortno as usize] =
        Some(FieldDesc::new(Reg::QsysTimedFrameEntry, 4, 7));
    f[F::QsysTimedFrameEntryTfrmTmSel as usize] =
        Some(FieldDesc::new(Reg::QsysTimedFrameEntry, 1, 3));
    f[F::QsysTimedFrameEntryTfrmTmT as usize] =
        Some(FieldDesc::new(Reg::QsysTimedFrameEntry, 0, 0));
    f[F::SysResetCfgCoreEna as usize] = Some(FieldDesc::new(Reg::SysResetCfg, 2, 2));
    f[F::SysResetCfgMemEna as usize] = Some(FieldDesc::new(Reg::SysResetCfg, 1, 1));
    f[F::SysResetCfgMemInit as usize] = Some(FieldDesc::new(Reg::SysResetCfg, 0, 0));
    f[F::GcbSoftRstSwcRst as usize] = Some(FieldDesc::new(Reg::GcbSoftRst, 1, 1));
    f
}

static FIELDS: [Option<FieldDesc>; REGFIELD_COUNT] = fields();

/// The VSC7514 ("Ocelot") switch.
pub static VSC7514: ChipDesc = ChipDesc {
    name: "vsc7514",
    map: RegMap {
        targets: [&ANA, &PTP, &QS, &QSYS, &REW, &SYS, &S2, &GCB, &HSIO],
    },
    fields: &FIELDS,
    required: &[
        Reg::AnaAdvlearn,
        Reg::AnaTablesMacaccess,
        Reg::QsXtrRd,
        Reg::QsInjWr,
        Reg::QsysPortMode,
        Reg::RewPortVlanCfg,
        Reg::SysResetCfg,
        Reg::S2CoreUpdateCtrl,
    ],
};
