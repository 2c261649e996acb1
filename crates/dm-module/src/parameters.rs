//! Map-making parameters read from the parameter product
//!
//! Every field has a default so a record can be built even before a product
//! is read. Optional thresholds are kept as `Option` so an explicit zero is
//! distinguishable from an absent element.

use crate::policies::RepeatPolicy;
use crate::{Error, Result};
use dm_ir::{Cursor, Document};
use dm_schema::SchemaRegistry;
use dm_schema::products::PARAMS_CONVERGENCE_PATCH;
use dm_xml::XmlParser;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

const DEFAULT_Z_MIN: f64 = 0.0;
const DEFAULT_Z_MAX: f64 = 10.0;
const DEFAULT_PATCH_WIDTH: f64 = 10.0;
const DEFAULT_PIXEL_SIZE_ARCMIN: f64 = 0.586;

/// One redshift interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RedshiftBin {
    pub z_min: f64,
    pub z_max: f64,
}

/// Projected centre of a patch, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ProjCenter {
    pub longitude: f64,
    pub latitude: f64,
}

/// A rectangular sky patch
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Patch {
    pub width: f64,
    /// Pixel size in arcminutes
    pub pixel_size: f64,
    pub center: ProjCenter,
}

impl Patch {
    /// Pixel size converted to degrees
    #[must_use]
    pub fn pixel_size_deg(&self) -> f64 {
        self.pixel_size / 60.0
    }
}

impl Default for Patch {
    fn default() -> Self {
        Self {
            width: DEFAULT_PATCH_WIDTH,
            pixel_size: DEFAULT_PIXEL_SIZE_ARCMIN,
            center: ProjCenter::default(),
        }
    }
}

/// Parameters for the convergence map maker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameters {
    pub n_inpaint: i64,
    pub equal_var_per_scale: bool,
    pub force_b_mode: bool,
    pub n_inp_scales: i64,
    pub add_borders: bool,
    pub n_it_reduced_shear: i64,
    pub rs_gauss_std: f64,
    pub rs_threshold_fdr: Option<f64>,
    pub gauss_std: f64,
    pub threshold_fdr: Option<f64>,
    pub n_z_bins: i64,
    pub balanced_bins: bool,
    pub redshift_bins: Vec<RedshiftBin>,
    /// Patch count declared by the last `PatchParams` group; `patches`
    /// may hold entries from every group
    pub n_patches: i64,
    pub patches: Vec<Patch>,
    pub n_samples: Option<i64>,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            n_inpaint: 100,
            equal_var_per_scale: false,
            force_b_mode: true,
            n_inp_scales: 0,
            add_borders: false,
            n_it_reduced_shear: 10,
            rs_gauss_std: 0.0,
            rs_threshold_fdr: None,
            gauss_std: 0.0,
            threshold_fdr: None,
            n_z_bins: 1,
            balanced_bins: false,
            redshift_bins: Vec::new(),
            n_patches: 1,
            patches: Vec::new(),
            n_samples: None,
        }
    }
}

impl Parameters {
    /// Read and extract a parameter product
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileNotFound`] when `path` does not exist,
    /// [`Error::Parse`] for malformed XML or a foreign product and
    /// [`Error::MissingField`] when a required element is absent.
    pub fn read_parameter_file(path: &Path, policy: RepeatPolicy) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let document = XmlParser::parse_file(path)?;
        ParameterExtractor::new(policy).extract(&document)
    }

    /// Lower redshift edge of the last bin
    #[must_use]
    pub fn z_min(&self) -> f64 {
        self.redshift_bins.last().map_or(DEFAULT_Z_MIN, |b| b.z_min)
    }

    /// Upper redshift edge of the last bin
    #[must_use]
    pub fn z_max(&self) -> f64 {
        self.redshift_bins.last().map_or(DEFAULT_Z_MAX, |b| b.z_max)
    }

    #[must_use]
    pub fn patch_width(&self) -> f64 {
        self.last_patch().width
    }

    /// Pixel size of the last patch, in arcminutes
    #[must_use]
    pub fn pixel_size(&self) -> f64 {
        self.last_patch().pixel_size
    }

    #[must_use]
    pub fn map_center(&self) -> ProjCenter {
        self.last_patch().center
    }

    /// Reduced-shear FDR threshold, zero when absent
    #[must_use]
    pub fn rs_threshold_fdr_or_default(&self) -> f64 {
        self.rs_threshold_fdr.unwrap_or(0.0)
    }

    /// Denoising FDR threshold, zero when absent
    #[must_use]
    pub fn threshold_fdr_or_default(&self) -> f64 {
        self.threshold_fdr.unwrap_or(0.0)
    }

    fn last_patch(&self) -> Patch {
        self.patches.last().copied().unwrap_or_default()
    }
}

/// Builds [`Parameters`] from a parsed parameter product
#[derive(Debug, Clone, Copy, Default)]
pub struct ParameterExtractor {
    policy: RepeatPolicy,
}

impl ParameterExtractor {
    #[must_use]
    pub fn new(policy: RepeatPolicy) -> Self {
        Self { policy }
    }

    /// Extract parameters from `document`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] when the document is not a parameter product
    /// or holds an unconvertible value, and [`Error::MissingField`] when a
    /// required element is absent or empty.
    pub fn extract(&self, document: &Document) -> Result<Parameters> {
        let source = document.source_name().to_string();
        debug!(source = %source, policy = ?self.policy, "Extracting parameters");

        let schema = SchemaRegistry::shared()
            .get(PARAMS_CONVERGENCE_PATCH)
            .map_err(|e| Error::from_schema(&source, e))?;
        dm_schema::check(document, schema)
            .into_result()
            .map_err(|e| Error::from_schema(&source, e))?;

        let read = Reader {
            root: document.cursor(),
            source: &source,
        };
        let mut params = Parameters::default();

        // Gaps
        params.n_inpaint = read.int("Data/GapsParams/NInpaint")?;
        info!("NInpaint: {}", params.n_inpaint);
        params.equal_var_per_scale = read.flag("Data/GapsParams/EqualVarPerScale")?;
        info!("EqualVarPerScale: {}", params.equal_var_per_scale);
        params.force_b_mode = read.flag("Data/GapsParams/ForceBMode")?;
        info!("ForceBMode: {}", params.force_b_mode);
        params.n_inp_scales = read.int("Data/GapsParams/NInpScale")?;
        info!("NInpScale: {}", params.n_inp_scales);
        params.add_borders = read.flag("Data/GapsParams/AddBorder")?;
        info!("AddBorder: {}", params.add_borders);

        // Reduced shear
        params.n_it_reduced_shear = read.int("Data/ReducedShear/NItReducedShear")?;
        info!("NItReducedShear: {}", params.n_it_reduced_shear);
        params.rs_gauss_std = read.float("Data/ReducedShear/GaussSTD")?;
        info!("ReducedShear GaussSTD: {}", params.rs_gauss_std);
        params.rs_threshold_fdr = read.opt_float("Data/ReducedShear/ThresholdFDR")?;
        info!(
            present = params.rs_threshold_fdr.is_some(),
            "ReducedShear ThresholdFDR: {}",
            params.rs_threshold_fdr_or_default()
        );

        // Denoising
        params.gauss_std = read.float("Data/DenoiseParams/GaussSTD")?;
        info!("GaussSTD: {}", params.gauss_std);
        params.threshold_fdr = read.opt_float("Data/DenoiseParams/ThresholdFDR")?;
        info!(
            present = params.threshold_fdr.is_some(),
            "ThresholdFDR: {}",
            params.threshold_fdr_or_default()
        );

        self.read_redshift_bins(&read, &mut params)?;
        self.read_patches(&read, &mut params)?;

        params.n_samples = read.opt_int("Data/NResamples")?;
        if let Some(n_samples) = params.n_samples {
            info!("NResamples: {}", n_samples);
        }

        debug!(
            bins = params.redshift_bins.len(),
            patches = params.patches.len(),
            "Parameters extracted"
        );
        Ok(params)
    }

    fn read_redshift_bins(&self, read: &Reader<'_>, params: &mut Parameters) -> Result<()> {
        params.n_z_bins = read.int("Data/RedshiftBins/Nbins")?;
        info!("Nbins: {}", params.n_z_bins);
        params.balanced_bins = read.flag("Data/RedshiftBins/BalancedBins")?;
        info!("BalancedBins: {}", params.balanced_bins);

        for entry in read.each("Data/RedshiftBins", "RedshiftBin") {
            let bin = RedshiftBin {
                z_min: read.float_at(&entry, "ZMin")?,
                z_max: read.float_at(&entry, "ZMax")?,
            };
            info!("ZMin: {} ZMax: {}", bin.z_min, bin.z_max);
            self.policy.fold(&mut params.redshift_bins, bin);
        }
        Ok(())
    }

    fn read_patches(&self, read: &Reader<'_>, params: &mut Parameters) -> Result<()> {
        for group in read.each("Data", "PatchParams") {
            params.n_patches = read.int_at(&group, "NPatches")?;
            info!("NPatches: {}", params.n_patches);

            for entry in group.children("PatchList") {
                let patch = Patch {
                    width: read.float_at(&entry, "PatchWidth")?,
                    pixel_size: read.float_at(&entry, "PixelSize")?,
                    center: ProjCenter {
                        longitude: read.float_at(&entry, "ProjCtr/Longitude")?,
                        latitude: read.float_at(&entry, "ProjCtr/Latitude")?,
                    },
                };
                info!("PatchWidth: {}", patch.width);
                info!(
                    "PixelSize: {} arcmin ({} deg)",
                    patch.pixel_size,
                    patch.pixel_size_deg()
                );
                info!(
                    "ProjCtr: ({}, {})",
                    patch.center.longitude, patch.center.latitude
                );
                self.policy.fold(&mut params.patches, patch);
            }
        }
        Ok(())
    }
}

/// Typed reads below the document root, tagging failures with the source
struct Reader<'a> {
    root: Cursor<'a>,
    source: &'a str,
}

impl<'a> Reader<'a> {
    fn int(&self, path: &str) -> Result<i64> {
        self.int_at(&self.root, path)
    }

    fn flag(&self, path: &str) -> Result<bool> {
        self.root.get_bool(path).map_err(|e| self.fail(e))
    }

    fn float(&self, path: &str) -> Result<f64> {
        self.float_at(&self.root, path)
    }

    fn opt_int(&self, path: &str) -> Result<Option<i64>> {
        let value = self.root.opt_i64(path).map_err(|e| self.fail(e))?;
        debug!(path, present = value.is_some(), "Probed optional element");
        Ok(value)
    }

    fn opt_float(&self, path: &str) -> Result<Option<f64>> {
        let value = self.root.opt_f64(path).map_err(|e| self.fail(e))?;
        debug!(path, present = value.is_some(), "Probed optional element");
        Ok(value)
    }

    fn int_at(&self, cursor: &Cursor<'a>, path: &str) -> Result<i64> {
        cursor.get_i64(path).map_err(|e| self.fail(e))
    }

    fn float_at(&self, cursor: &Cursor<'a>, path: &str) -> Result<f64> {
        cursor.get_f64(path).map_err(|e| self.fail(e))
    }

    /// Every `name` child of the element at `parent`; none when it is absent
    fn each(&self, parent: &str, name: &str) -> Vec<Cursor<'a>> {
        self.root
            .navigate(parent)
            .map(|p| p.children(name))
            .unwrap_or_default()
    }

    fn fail(&self, error: dm_ir::Error) -> Error {
        Error::from_ir(self.source, error)
    }
}
