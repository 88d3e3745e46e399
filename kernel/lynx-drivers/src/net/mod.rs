//! Networking: switch register access and MDIO bus masters.

pub mod ocelot;
pub mod xgmac_mdio;
