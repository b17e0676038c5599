//! Whole-pipeline scenarios on small synthetic sites.

use std::cell::RefCell;

use drillroute::api::*;
use drillroute::geom::BlockedGeometry;
use drillroute::prelude::{Polygon, Polyline, Pose, Vec2};

fn v(x: f64, y: f64) -> Vec2 {
    Vec2::new(x, y)
}

/// 20×20 site, home at (1, 1) facing +x, one street (5,5)→(15,5), hole 3 at (10,10).
fn square_site() -> PlanRequest {
    PlanRequest {
        geofence: Polygon::rect(0.0, 0.0, 20.0, 20.0),
        home: [v(1.0, 1.0), v(2.0, 1.0)],
        streets: vec![Polyline::new(vec![v(5.0, 5.0), v(15.0, 5.0)])],
        transit_streets: Vec::new(),
        holes: vec![HoleInput {
            id: 3,
            x: 10.0,
            y: 10.0,
        }],
        low_obstacles: Vec::new(),
        high_obstacles: Vec::new(),
    }
}

#[test]
fn square_site_plans_and_routes_home_to_hole() {
    let seen = RefCell::new(Vec::new());
    let sink = |p: f64| seen.borrow_mut().push(p);
    let out = plan(&square_site(), &PlanOptions::default(), &PlanCfg::default(), &sink).unwrap();
    let graph = &out.graph;

    assert_eq!(graph.nodes_of(PoseType::Home).len(), 1);
    let hole = graph.hole_node(3).expect("hole node tagged with its id");
    assert_eq!(graph.check_connectivity(), Ok(()));

    let finder = PathFinder::from_graph(graph);
    let home = finder.named(NamedKey::Home).unwrap();
    assert_eq!(finder.named(NamedKey::Hole(3)), Some(hole));
    let path = finder.find_path(home, hole).unwrap().expect("route to the hole");
    assert!(path.len() >= 2);
    assert_eq!(path[0].id, home);
    let end = path.last().unwrap();
    let reach = (v(end.x, end.y) - v(10.0, 10.0)).norm();
    assert!(reach <= 3.8 + 0.05, "route ends {reach} from the hole");

    let seen = seen.into_inner();
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(seen.last(), Some(&100.0));
}

#[test]
fn persisted_records_answer_the_same_queries() {
    let cfg = PlanCfg::default();
    let out = plan(&square_site(), &PlanOptions::default(), &cfg, &NoProgress).unwrap();
    let back: Vec<PoseRecord> = out.graph.to_records();
    assert_eq!(PoseGraph::from_records(&back).unwrap(), out.graph);

    let handle = GraphHandle::new();
    handle.load(PathFinder::from_records(&back).unwrap());
    let named = handle.list_named_nodes().unwrap();
    assert_eq!(named[0].key, NamedKey::Home);
    assert_eq!(named[1].key, NamedKey::Hole(3));
    let direct = PathFinder::from_graph(&out.graph)
        .find_path(named[0].id, named[1].id)
        .unwrap();
    assert_eq!(handle.find_path(named[0].id, named[1].id).unwrap(), direct);
}

#[test]
fn hole_walled_in_by_an_obstacle_is_reported_by_id() {
    let fence = Polygon::rect(0.0, 0.0, 40.0, 40.0);
    let hole = v(20.0, 20.0);
    let wall = Polygon::rect(15.0, 15.0, 25.0, 25.0);
    let blocked = BlockedGeometry::build(&[hole], &[wall], &fence, 0.75);
    let streets = vec![(0..=40)
        .map(|k| Pose::new(5.0 + 0.75 * k as f64, 5.0, 0.0))
        .collect::<Vec<_>>()];
    let holes = [HoleTarget {
        id: 812,
        position: hole,
        street: Some(0),
    }];
    let input = AssemblyInput {
        home: Pose::new(3.0, 5.0, 0.0),
        street_poses: &streets,
        transit_poses: &[],
        holes: &holes,
        blocked: &blocked,
    };
    let err = assemble(&input, &AssemblyCfg::default(), &Progress::new(&NoProgress)).unwrap_err();
    assert_eq!(err, PlanError::UnreachableHole { hole_id: 812 });
    assert!(err.to_string().contains("812"));
}

#[test]
fn transit_lane_adds_mirrored_poses() {
    let mut request = square_site();
    request.transit_streets = vec![Polyline::new(vec![v(5.0, 8.0), v(12.0, 8.0)])];
    let options = PlanOptions {
        use_transit_streets: true,
        ..PlanOptions::default()
    };
    let cfg = PlanCfg::default();
    let with = plan(&request, &options, &cfg, &NoProgress).unwrap();
    let without = plan(&request, &PlanOptions::default(), &cfg, &NoProgress).unwrap();
    let transit = with.graph.nodes_of(PoseType::TransitStreet);
    assert!(!transit.is_empty());
    assert_eq!(transit.len() % 2, 0);
    assert!(without.graph.nodes_of(PoseType::TransitStreet).is_empty());
}
