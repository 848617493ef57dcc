/// Vector literals for command-line overrides
///
/// `point3` reads `"x, y, z"` (commas and/or whitespace), `path` reads points
/// joined by `->`.
use nalgebra::Point3;
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, multispace0, multispace1},
    combinator::{all_consuming, map},
    multi::separated_list1,
    number::complete::float,
    sequence::{delimited, preceded, tuple},
    IResult,
};

use crate::error::{SceneError, SceneResult};

fn separator(input: &str) -> IResult<&str, ()> {
    alt((
        map(delimited(multispace0, char(','), multispace0), |_| ()),
        map(multispace1, |_| ()),
    ))(input)
}

fn point(input: &str) -> IResult<&str, Point3<f32>> {
    let (input, (x, _, y, _, z)) = preceded(
        multispace0,
        tuple((float, separator, float, separator, float)),
    )(input)?;
    Ok((input, Point3::new(x, y, z)))
}

fn arrow(input: &str) -> IResult<&str, &str> {
    delimited(multispace0, tag("->"), multispace0)(input)
}

fn finite<'a>(
    points: impl IntoIterator<Item = &'a Point3<f32>>,
    literal: &str,
) -> SceneResult<()> {
    if points
        .into_iter()
        .all(|p| p.coords.iter().all(|c| c.is_finite()))
    {
        Ok(())
    } else {
        Err(SceneError::parse(format!("non-finite coordinate in `{literal}`")))
    }
}

/// Parse a single point such as `"1, 2.5, -3"`.
pub fn point3(literal: &str) -> SceneResult<Point3<f32>> {
    let (_, p) = all_consuming(delimited(multispace0, point, multispace0))(literal)
        .map_err(|e| SceneError::parse(format!("invalid point `{literal}`: {e}")))?;
    finite([&p], literal)?;
    Ok(p)
}

/// Parse a polyline such as `"0,0,1.4 -> 0,0,0.1"`.
pub fn path(literal: &str) -> SceneResult<Vec<Point3<f32>>> {
    let (_, points) = all_consuming(delimited(
        multispace0,
        separated_list1(arrow, point),
        multispace0,
    ))(literal)
    .map_err(|e| SceneError::parse(format!("invalid path `{literal}`: {e}")))?;
    finite(&points, literal)?;
    Ok(points)
}
