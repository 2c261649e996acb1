//! Parameter extraction from full parameter products

mod common;

use common::{GAPS, PARAMETER_PRODUCT, minimal_parameters};
use dm_module::{Error, ParameterExtractor, Parameters, ProjCenter, RedshiftBin, RepeatPolicy};
use dm_xml::XmlParser;

fn extract(xml: &str, policy: RepeatPolicy) -> Result<Parameters, Error> {
    let document = XmlParser::new()
        .with_source_name("params.xml")
        .parse_str(xml)?;
    ParameterExtractor::new(policy).extract(&document)
}

#[test]
fn collect_all_keeps_every_bin_and_patch_in_order() -> anyhow::Result<()> {
    let params = extract(PARAMETER_PRODUCT, RepeatPolicy::CollectAll)?;

    assert_eq!(params.n_inpaint, 50);
    assert!(params.equal_var_per_scale);
    assert!(!params.force_b_mode);
    assert_eq!(params.n_inp_scales, 4);
    assert!(params.add_borders);
    assert_eq!(params.n_it_reduced_shear, 3);
    assert_eq!(params.rs_gauss_std, 0.5);
    assert_eq!(params.gauss_std, 2.5);
    assert_eq!(params.n_z_bins, 2);
    assert!(!params.balanced_bins);

    assert_eq!(
        params.redshift_bins,
        vec![
            RedshiftBin { z_min: 0.2, z_max: 0.6 },
            RedshiftBin { z_min: 0.6, z_max: 1.4 },
        ]
    );
    assert_eq!(params.patches.len(), 2);
    assert_eq!(params.patches[0].width, 5.0);
    assert_eq!(params.n_patches, 2);
    Ok(())
}

#[test]
fn keep_last_retains_only_the_final_elements() -> anyhow::Result<()> {
    let params = extract(PARAMETER_PRODUCT, RepeatPolicy::KeepLast)?;

    assert_eq!(params.redshift_bins, vec![RedshiftBin { z_min: 0.6, z_max: 1.4 }]);
    assert_eq!(params.patches.len(), 1);
    assert_eq!(params.patch_width(), 10.0);
    Ok(())
}

#[test]
fn patch_count_comes_from_the_last_group_while_patches_span_all_groups() -> anyhow::Result<()> {
    let xml = PARAMETER_PRODUCT.replace("<NPatches>2</NPatches>", "<NPatches>5</NPatches>");

    let collected = extract(&xml, RepeatPolicy::CollectAll)?;
    assert_eq!(collected.n_patches, 5);
    assert_eq!(collected.patches.len(), 2);
    assert_eq!(collected.patches[0].width, 5.0);
    assert_eq!(collected.patches[1].width, 10.0);

    let last = extract(&xml, RepeatPolicy::KeepLast)?;
    assert_eq!(last.n_patches, 5);
    assert_eq!(last.patches.len(), 1);
    Ok(())
}

#[test]
fn scalar_accessors_agree_across_policies() -> anyhow::Result<()> {
    let all = extract(PARAMETER_PRODUCT, RepeatPolicy::CollectAll)?;
    let last = extract(PARAMETER_PRODUCT, RepeatPolicy::KeepLast)?;

    for params in [&all, &last] {
        assert_eq!(params.z_min(), 0.6);
        assert_eq!(params.z_max(), 1.4);
        assert_eq!(params.pixel_size(), 35.16);
        assert_eq!(
            params.map_center(),
            ProjCenter {
                longitude: 1.0,
                latitude: 2.0
            }
        );
    }
    Ok(())
}

#[test]
fn explicit_zero_threshold_is_present() -> anyhow::Result<()> {
    let params = extract(PARAMETER_PRODUCT, RepeatPolicy::default())?;

    assert_eq!(params.rs_threshold_fdr, Some(0.0));
    assert_eq!(params.threshold_fdr, None);
    assert_eq!(params.threshold_fdr_or_default(), 0.0);
    Ok(())
}

#[test]
fn absent_and_empty_thresholds_read_as_zero() -> anyhow::Result<()> {
    let absent = extract(
        &minimal_parameters(GAPS, "<GaussSTD>1</GaussSTD>"),
        RepeatPolicy::default(),
    )?;
    assert_eq!(absent.threshold_fdr, None);
    assert_eq!(absent.rs_threshold_fdr, None);
    assert_eq!(absent.threshold_fdr_or_default(), 0.0);

    let empty = extract(
        &minimal_parameters(GAPS, "<GaussSTD>1</GaussSTD><ThresholdFDR/>"),
        RepeatPolicy::default(),
    )?;
    assert_eq!(empty.threshold_fdr, None);

    let set = extract(
        &minimal_parameters(GAPS, "<GaussSTD>1</GaussSTD><ThresholdFDR>0.05</ThresholdFDR>"),
        RepeatPolicy::default(),
    )?;
    assert_eq!(set.threshold_fdr, Some(0.05));
    Ok(())
}

#[test]
fn single_patch_is_read_in_arcminutes() -> anyhow::Result<()> {
    let params = extract(
        &minimal_parameters(GAPS, "<GaussSTD>0</GaussSTD>"),
        RepeatPolicy::default(),
    )?;

    assert_eq!(params.patch_width(), 10.0);
    assert_eq!(params.pixel_size(), 35.16);
    assert!((params.patches[0].pixel_size_deg() - 0.586).abs() < 1e-12);
    assert_eq!(
        params.map_center(),
        ProjCenter {
            longitude: 1.0,
            latitude: 2.0
        }
    );
    assert_eq!(params.n_samples, None);
    Ok(())
}

#[test]
fn missing_required_scalar_names_its_path() {
    let gaps = "<EqualVarPerScale>0</EqualVarPerScale><ForceBMode>1</ForceBMode>\
                <NInpScale>0</NInpScale><AddBorder>0</AddBorder>";
    let err = extract(
        &minimal_parameters(gaps, "<GaussSTD>0</GaussSTD>"),
        RepeatPolicy::default(),
    )
    .unwrap_err();

    assert_eq!(
        err,
        Error::MissingField {
            path: "DpdTwoDMassParamsConvergencePatch/Data/GapsParams/NInpaint".to_string()
        }
    );
}

#[test]
fn unconvertible_value_is_a_parse_error() {
    let gaps = GAPS.replace("<NInpaint>100</NInpaint>", "<NInpaint>many</NInpaint>");
    let err = extract(
        &minimal_parameters(&gaps, "<GaussSTD>0</GaussSTD>"),
        RepeatPolicy::default(),
    )
    .unwrap_err();

    assert!(
        matches!(err, Error::Parse { ref source_name, ref message }
            if source_name == "params.xml" && message.contains("NInpaint")),
        "{err}"
    );
}

#[test]
fn wrong_root_element_is_a_parse_error() {
    let err = extract(common::INPUT_PRODUCT, RepeatPolicy::default()).unwrap_err();
    assert!(matches!(err, Error::Parse { .. }), "{err}");
}

#[test]
fn malformed_xml_is_a_parse_error() {
    let err = extract("<DpdTwoDMassParamsConvergencePatch><Data>", RepeatPolicy::default())
        .unwrap_err();
    assert!(matches!(err, Error::Parse { ref source_name, .. } if source_name == "params.xml"));
}

#[test]
fn read_parameter_file_reports_missing_file() {
    let err = Parameters::read_parameter_file(
        std::path::Path::new("/nonexistent/params.xml"),
        RepeatPolicy::default(),
    )
    .unwrap_err();
    assert_eq!(
        err,
        Error::FileNotFound {
            path: "/nonexistent/params.xml".to_string()
        }
    );
}

#[test]
fn parameters_serialize_for_reporting() -> anyhow::Result<()> {
    let params = extract(PARAMETER_PRODUCT, RepeatPolicy::KeepLast)?;
    let json = serde_json::to_value(&params)?;

    assert_eq!(json["n_inpaint"], 50);
    assert_eq!(json["rs_threshold_fdr"], 0.0);
    assert!(json["threshold_fdr"].is_null());
    assert_eq!(json["patches"][0]["center"]["latitude"], 2.0);
    Ok(())
}
