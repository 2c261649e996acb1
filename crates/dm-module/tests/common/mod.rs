//! Product fixtures shared by the integration tests
#![allow(dead_code)]

use std::fs;
use std::path::Path;

pub const INPUT_PRODUCT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<dpd-le3-wl-twodmass-inp-lensmccatalog:DpdTwoDMassLensMCCatalog xmlns:dpd-le3-wl-twodmass-inp-lensmccatalog="http://euclid.esa.org/schema/dpd/le3/wl/twodmass/inp/lensmccatalog">
    <Header>
        <ProductId>LensMC-001</ProductId>
        <ProductType>DpdTwoDMassLensMCCatalog</ProductType>
    </Header>
    <Data>
        <ShearCatalog format="le3.wl.2dmass.input.lensmccatalog" version="0.1">
            <DataContainer filestatus="PROPOSED">
                <FileName>EUC_LE3_WL_LensMC_Catalog.fits</FileName>
            </DataContainer>
        </ShearCatalog>
    </Data>
</dpd-le3-wl-twodmass-inp-lensmccatalog:DpdTwoDMassLensMCCatalog>
"#;

/// Parameter product with two redshift bins and two patch groups
pub const PARAMETER_PRODUCT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<p:DpdTwoDMassParamsConvergencePatch xmlns:p="http://euclid.esa.org/schema/dpd/le3/wl/twodmass/inp/paramsconvergencepatch">
    <Data>
        <GapsParams>
            <NInpaint>50</NInpaint>
            <EqualVarPerScale>1</EqualVarPerScale>
            <ForceBMode>false</ForceBMode>
            <NInpScale>4</NInpScale>
            <AddBorder>true</AddBorder>
        </GapsParams>
        <ReducedShear>
            <NItReducedShear>3</NItReducedShear>
            <GaussSTD>0.5</GaussSTD>
            <ThresholdFDR>0</ThresholdFDR>
        </ReducedShear>
        <DenoiseParams>
            <GaussSTD>2.5</GaussSTD>
        </DenoiseParams>
        <RedshiftBins>
            <Nbins>2</Nbins>
            <BalancedBins>0</BalancedBins>
            <RedshiftBin>
                <ZMin>0.2</ZMin>
                <ZMax>0.6</ZMax>
            </RedshiftBin>
            <RedshiftBin>
                <ZMin>0.6</ZMin>
                <ZMax>1.4</ZMax>
            </RedshiftBin>
        </RedshiftBins>
        <PatchParams>
            <NPatches>1</NPatches>
            <PatchList>
                <PatchWidth>5</PatchWidth>
                <PixelSize>0.5</PixelSize>
                <ProjCtr>
                    <Longitude>10.0</Longitude>
                    <Latitude>-5.0</Latitude>
                </ProjCtr>
            </PatchList>
        </PatchParams>
        <PatchParams>
            <NPatches>2</NPatches>
            <PatchList>
                <PatchWidth>10</PatchWidth>
                <PixelSize>35.16</PixelSize>
                <ProjCtr>
                    <Longitude>1.0</Longitude>
                    <Latitude>2.0</Latitude>
                </ProjCtr>
            </PatchList>
        </PatchParams>
    </Data>
</p:DpdTwoDMassParamsConvergencePatch>
"#;

/// Parameter product with exactly one patch and `gaps` replacing the gap block
pub fn minimal_parameters(gaps: &str, denoise: &str) -> String {
    format!(
        r#"<DpdTwoDMassParamsConvergencePatch>
  <Data>
    <GapsParams>{gaps}</GapsParams>
    <ReducedShear>
      <NItReducedShear>10</NItReducedShear>
      <GaussSTD>0</GaussSTD>
    </ReducedShear>
    <DenoiseParams>{denoise}</DenoiseParams>
    <RedshiftBins>
      <Nbins>1</Nbins>
      <BalancedBins>false</BalancedBins>
      <RedshiftBin><ZMin>0.1</ZMin><ZMax>2.0</ZMax></RedshiftBin>
    </RedshiftBins>
    <PatchParams>
      <NPatches>1</NPatches>
      <PatchList>
        <PatchWidth>10</PatchWidth>
        <PixelSize>35.16</PixelSize>
        <ProjCtr><Longitude>1.0</Longitude><Latitude>2.0</Latitude></ProjCtr>
      </PatchList>
    </PatchParams>
  </Data>
</DpdTwoDMassParamsConvergencePatch>"#
    )
}

pub const GAPS: &str = "<NInpaint>100</NInpaint><EqualVarPerScale>false</EqualVarPerScale>\
<ForceBMode>true</ForceBMode><NInpScale>0</NInpScale><AddBorder>false</AddBorder>";

/// Work directory holding the input and parameter products
pub fn workdir_with_products(dir: &Path) {
    fs::write(dir.join("in.xml"), INPUT_PRODUCT).expect("write input product");
    fs::write(dir.join("params.xml"), PARAMETER_PRODUCT).expect("write parameter product");
}
