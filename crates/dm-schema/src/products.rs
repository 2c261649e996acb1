//! Built-in schemas of the 2D-mass products handled by the module
//!
//! Only the parts of each product the module reads or writes are described;
//! anything else in a document is ignored.

use crate::model::{DataType, ElementDefinition, ProductSchema};
use dm_ir::Severity;

pub const LENS_MC_CATALOG: &str = "DpdTwoDMassLensMCCatalog";
pub const PARAMS_CONVERGENCE_PATCH: &str = "DpdTwoDMassParamsConvergencePatch";
pub const CONVERGENCE_PATCH: &str = "DpdTwoDMassConvergencePatch";

pub const LENS_MC_CATALOG_NS: &str = "http://euclid.esa.org/schema/dpd/le3/wl/twodmass/inp/lensmccatalog";
pub const PARAMS_CONVERGENCE_PATCH_NS: &str =
    "http://euclid.esa.org/schema/dpd/le3/wl/twodmass/inp/paramsconvergencepatch";
pub const CONVERGENCE_PATCH_NS: &str = "http://euclid.esa.org/schema/dpd/le3/wl/twodmass/out/convergencepatch";

/// Path of the catalog file name inside the input product
pub const SHEAR_CATALOG_FILE: &str = "Data/ShearCatalog/DataContainer/FileName";

/// A bare file name: no directory separators
pub const BASENAME_PATTERN: &str = r"^[^/\\]+$";

const SCHEMA_VERSION: &str = "0.1";

/// Input product pointing at the LensMC shear catalog
#[must_use]
pub fn lens_mc_catalog() -> ProductSchema {
    ProductSchema::new(LENS_MC_CATALOG, LENS_MC_CATALOG_NS, SCHEMA_VERSION).element(
        ElementDefinition::required(SHEAR_CATALOG_FILE, DataType::String)
            .pattern(BASENAME_PATTERN, Severity::Warning),
    )
}

/// Parameter product for convergence patch map making
#[must_use]
pub fn params_convergence_patch() -> ProductSchema {
    use ElementDefinition as E;

    ProductSchema::new(
        PARAMS_CONVERGENCE_PATCH,
        PARAMS_CONVERGENCE_PATCH_NS,
        SCHEMA_VERSION,
    )
    .element(E::required("Data/GapsParams/NInpaint", DataType::Integer))
    .element(E::required("Data/GapsParams/EqualVarPerScale", DataType::Boolean))
    .element(E::required("Data/GapsParams/ForceBMode", DataType::Boolean))
    .element(E::required("Data/GapsParams/NInpScale", DataType::Integer))
    .element(E::required("Data/GapsParams/AddBorder", DataType::Boolean))
    .element(E::required("Data/ReducedShear/NItReducedShear", DataType::Integer))
    .element(E::required("Data/ReducedShear/GaussSTD", DataType::Decimal))
    .element(E::optional("Data/ReducedShear/ThresholdFDR", DataType::Decimal))
    .element(E::required("Data/DenoiseParams/GaussSTD", DataType::Decimal))
    .element(E::optional("Data/DenoiseParams/ThresholdFDR", DataType::Decimal))
    .element(E::required("Data/RedshiftBins/Nbins", DataType::Integer))
    .element(E::required("Data/RedshiftBins/BalancedBins", DataType::Boolean))
    .element(E::repeated(
        "Data/RedshiftBins/RedshiftBin",
        0,
        vec![
            E::required("ZMin", DataType::Decimal),
            E::required("ZMax", DataType::Decimal),
        ],
    ))
    .element(E::repeated(
        "Data/PatchParams",
        0,
        vec![
            E::required("NPatches", DataType::Integer),
            E::repeated(
                "PatchList",
                0,
                vec![
                    E::required("PatchWidth", DataType::Decimal),
                    E::required("PixelSize", DataType::Decimal),
                    E::required("ProjCtr/Longitude", DataType::Decimal),
                    E::required("ProjCtr/Latitude", DataType::Decimal),
                ],
            ),
        ],
    ))
    .element(E::optional("Data/NResamples", DataType::Integer))
}

/// Output product describing the produced convergence map
#[must_use]
pub fn convergence_patch() -> ProductSchema {
    use ElementDefinition as E;

    ProductSchema::new(CONVERGENCE_PATCH, CONVERGENCE_PATCH_NS, SCHEMA_VERSION)
        .element(E::required("Header/ProductId", DataType::String))
        .element(E::required("Header/ProductType", DataType::String))
        .element(E::required("Header/CreationDate", DataType::String))
        .element(E::required("Data/NResamples", DataType::Integer))
        .element(E::optional_group(
            "Data/NoisyConvergence",
            vec![
                E::required("DataContainer/FileName", DataType::String)
                    .pattern(BASENAME_PATTERN, Severity::Error),
            ],
        ))
}
