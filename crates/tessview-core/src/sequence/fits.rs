use std::path::{Path, PathBuf};

use fitrs::{Fits, FitsData, FitsDataArray, Hdu, HeaderValue};
use ndarray::{Array2, ArrayD, IxDyn};

use crate::error::{Result, TessviewError};


/// A decoded 2D FITS image plus its observation time, if the header had one.
#[derive(Clone, Debug)]
pub struct FitsImage {
    pub data: Array2<f32>,
    pub time: Option<f64>,
}

/// Shape and time read from a header without touching the pixel data.
#[derive(Clone, Debug, PartialEq)]
pub struct FitsHeaderInfo {
    /// Array shape in row-major order (slowest axis first), i.e. the reverse
    /// of NAXIS1..NAXISn.
    pub shape: Vec<usize>,
    pub time: Option<f64>,
}

fn open_hdu(path: &Path, extension: usize) -> Result<Hdu> {
    let fits = Fits::open(path)
        .map_err(|e| TessviewError::Fits(format!("{}: {e}", path.display())))?;
    fits.get(extension).ok_or_else(|| {
        TessviewError::Fits(format!(
            "{}: no HDU at extension {extension}",
            path.display()
        ))
    })
}

fn header_f64(hdu: &Hdu, key: &str) -> Option<f64> {
    match hdu.value(key)? {
        HeaderValue::IntegerNumber(n) => Some(*n as f64),
        HeaderValue::RealFloatingNumber(f) => Some(*f),
        _ => None,
    }
}

fn header_usize(hdu: &Hdu, key: &str) -> Option<usize> {
    match hdu.value(key)? {
        HeaderValue::IntegerNumber(n) if *n >= 0 => Some(*n as usize),
        _ => None,
    }
}

/// Observation time from the header: `MIDTIME`, then the midpoint of
/// `TSTART`/`TSTOP`, then `TIME`.
fn header_time(hdu: &Hdu) -> Option<f64> {
    header_f64(hdu, "MIDTIME")
        .or_else(|| match (header_f64(hdu, "TSTART"), header_f64(hdu, "TSTOP")) {
            (Some(start), Some(stop)) => Some(0.5 * (start + stop)),
            _ => None,
        })
        .or_else(|| header_f64(hdu, "TIME"))
}

fn header_shape(hdu: &Hdu, path: &Path) -> Result<Vec<usize>> {
    let naxis = header_usize(hdu, "NAXIS")
        .ok_or_else(|| TessviewError::Fits(format!("{}: missing NAXIS", path.display())))?;
    let mut shape = Vec::with_capacity(naxis);
    for axis in (1..=naxis).rev() {
        let len = header_usize(hdu, &format!("NAXIS{axis}")).ok_or_else(|| {
            TessviewError::Fits(format!("{}: missing NAXIS{axis}", path.display()))
        })?;
        shape.push(len);
    }
    Ok(shape)
}

/// Read shape and time from one HDU's header.
pub fn read_header_info(path: &Path, extension: usize) -> Result<FitsHeaderInfo> {
    let hdu = open_hdu(path, extension)?;
    Ok(FitsHeaderInfo {
        shape: header_shape(&hdu, path)?,
        time: header_time(&hdu),
    })
}

/// Read an HDU of any rank as physical values (BSCALE/BZERO applied).
/// Blank integer pixels become NaN.
pub fn read_array(path: &Path, extension: usize) -> Result<ArrayD<f32>> {
    let hdu = open_hdu(path, extension)?;
    decode_hdu(&hdu, path)
}

fn decode_hdu(hdu: &Hdu, path: &Path) -> Result<ArrayD<f32>> {
    let shape = header_shape(hdu, path)?;
    let bscale = header_f64(hdu, "BSCALE").unwrap_or(1.0);
    let bzero = header_f64(hdu, "BZERO").unwrap_or(0.0);
    let scale = |v: f64| (v * bscale + bzero) as f32;

    let values: Vec<f32> = match hdu.read_data() {
        FitsData::IntegersI32(FitsDataArray { data, .. }) => data
            .iter()
            .map(|v| v.map_or(f32::NAN, |x| scale(x as f64)))
            .collect(),
        FitsData::IntegersU32(FitsDataArray { data, .. }) => data
            .iter()
            .map(|v| v.map_or(f32::NAN, |x| scale(x as f64)))
            .collect(),
        FitsData::FloatingPoint32(FitsDataArray { data, .. }) => {
            data.iter().map(|&x| scale(x as f64)).collect()
        }
        FitsData::FloatingPoint64(FitsDataArray { data, .. }) => {
            data.iter().map(|&x| scale(x)).collect()
        }
        FitsData::Characters(_) => {
            return Err(TessviewError::Fits(format!(
                "{}: character data is not an image",
                path.display()
            )))
        }
    };

    ArrayD::from_shape_vec(IxDyn(&shape), values)
        .map_err(|e| TessviewError::Shape(format!("{}: {e}", path.display())))
}

/// Read a 2D image HDU. Leading length-1 axes are squeezed away.
pub fn read_image(path: &Path, extension: usize) -> Result<FitsImage> {
    let hdu = open_hdu(path, extension)?;
    let array = decode_hdu(&hdu, path)?;
    Ok(FitsImage {
        data: squeeze_to_2d(array, path)?,
        time: header_time(&hdu),
    })
}

fn squeeze_to_2d(array: ArrayD<f32>, path: &Path) -> Result<Array2<f32>> {
    let kept: Vec<usize> = array.shape().iter().copied().filter(|&n| n != 1).collect();
    let shape = match kept.len() {
        2 => (kept[0], kept[1]),
        1 if array.ndim() >= 2 => {
            let dims = array.shape();
            (dims[dims.len() - 2], dims[dims.len() - 1])
        }
        _ => {
            return Err(TessviewError::Shape(format!(
                "{}: expected a 2D image, got shape {:?}",
                path.display(),
                array.shape()
            )))
        }
    };
    let flat: Vec<f32> = array.iter().copied().collect();
    Array2::from_shape_vec(shape, flat)
        .map_err(|e| TessviewError::Shape(format!("{}: {e}", path.display())))
}

/// Expand a glob pattern (`*`, `?`, `[...]`, `**`) into the matching files,
/// sorted by path. Wildcards may appear in any path component.
pub fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let entries = glob::glob(pattern)
        .map_err(|e| TessviewError::UnsupportedSource(format!("bad pattern '{pattern}': {e}")))?;
    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| TessviewError::Io(e.into_error()))?;
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// True if `s` contains glob wildcards.
pub fn is_pattern(s: &str) -> bool {
    s.contains(['*', '?', '['])
}
